//! Single-writer growable list of `i64` with optimistic snapshots.
//!
//! # Threading Model
//!
//! ```text
//!   writer thread (exactly one)          reader threads (any number)
//!   ───────────────────────────          ───────────────────────────
//!   set / insert / push / clear ...      list.reader().snapshot()
//!         │                                     │
//!         ▼                                     ▼
//!   lock.write()  (stamp -> odd)         acquire_read / copy / validate
//!   mutate buffer + length                      │
//!   guard drop    (stamp -> even)               ▼
//!                                        torn-free Snapshot
//! ```
//!
//! Every mutator runs inside exactly one write bracket, so a snapshot observes
//! either all of a mutation or none of it. A mutator called while another
//! thread's write is in progress panics before touching the list.
//!
//! Direct reads on the list (`get`, `get_unchecked`, `index_of`,
//! `binary_search_block`, `Display`) are not stamp-protected. They are memory
//! safe from any thread but only meaningful on the writer thread. Other threads
//! read through snapshots.
//!
//! # Growth
//!
//! Capacity only grows: `new_capacity = max(2 * capacity, required)`. The old
//! buffer is retired through the list's [`Guard`] because concurrent readers may
//! still be copying it.

use std::fmt;
use std::sync::atomic::{AtomicPtr, AtomicUsize, Ordering};

use crate::error::{ListError, Result};
use crate::guard::{DeferredGuard, Guard};
use crate::preemptive_synchronization::StampedSpinLock;

use super::backing_store::{Buffer, drop_buffer};
use super::block_search::{self, ScanDirection};
use super::options::ListOptions;
use super::snapshot::{self, Snapshot, SnapshotReader};

/// Largest capacity a list may hold. Larger requests, including overflowed
/// length arithmetic, fail with [`ListError::InvalidCapacity`].
pub const MAX_CAPACITY: usize = isize::MAX as usize / std::mem::size_of::<i64>();

pub struct SnapshottableList<G: Guard = DeferredGuard> {
    lock: StampedSpinLock,
    buffer: AtomicPtr<Buffer>,
    size: AtomicUsize,
    no_entry_value: i64,
    guard: G,
}

impl<G: Guard> SnapshottableList<G> {
    /// # Panics
    ///
    /// Panics if `initial_capacity` exceeds [`MAX_CAPACITY`]. Use
    /// [`SnapshottableList::try_new`] to get an error instead.
    pub fn new(initial_capacity: usize, no_entry_value: i64) -> Self {
        match Self::try_new(initial_capacity, no_entry_value) {
            Ok(list) => list,
            Err(err) => panic!("{}", err),
        }
    }

    /// Fails with [`ListError::InvalidCapacity`] if `initial_capacity` exceeds
    /// [`MAX_CAPACITY`].
    pub fn try_new(initial_capacity: usize, no_entry_value: i64) -> Result<Self> {
        if initial_capacity > MAX_CAPACITY {
            return Err(ListError::InvalidCapacity {
                requested: initial_capacity,
            });
        }

        let buffer = Box::new(Buffer::filled(initial_capacity, no_entry_value));
        Ok(SnapshottableList {
            lock: StampedSpinLock::new(),
            buffer: AtomicPtr::new(Box::into_raw(buffer)),
            size: AtomicUsize::new(0),
            no_entry_value,
            guard: G::default(),
        })
    }

    pub fn with_options(options: ListOptions) -> Self {
        Self::new(options.initial_capacity, options.no_entry_value)
    }

    pub fn try_with_options(options: ListOptions) -> Result<Self> {
        Self::try_new(options.initial_capacity, options.no_entry_value)
    }

    // =========================================================================
    // Properties
    // =========================================================================

    pub fn len(&self) -> usize {
        self.size.load(Ordering::Relaxed)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.with_buffer(|buffer| buffer.capacity())
    }

    pub fn no_entry_value(&self) -> i64 {
        self.no_entry_value
    }

    /// Current stamp of the list's lock. Even while no write is in progress;
    /// advances by two per write.
    pub fn stamp(&self) -> u64 {
        self.lock.stamp()
    }

    pub(crate) fn lock(&self) -> &StampedSpinLock {
        &self.lock
    }

    // =========================================================================
    // Reads (writer thread)
    // =========================================================================

    pub fn get(&self, index: usize) -> Result<i64> {
        let len = self.len();
        if index < len {
            Ok(self.with_buffer(|buffer| buffer.load(index)))
        } else {
            Err(ListError::OutOfRange { index, len })
        }
    }

    /// Read without a bounds check.
    ///
    /// # Safety
    ///
    /// `index` must be less than `len()`.
    #[inline]
    pub unsafe fn get_unchecked(&self, index: usize) -> i64 {
        debug_assert!(index < self.len());
        self.with_buffer(|buffer| unsafe { buffer.load_unchecked(index) })
    }

    pub fn index_of(&self, value: i64) -> Option<usize> {
        let len = self.len();
        self.with_buffer(|buffer| {
            buffer.slots()[..len]
                .iter()
                .position(|slot| slot.load(Ordering::Relaxed) == value)
        })
    }

    /// Block binary search over the live list. See [`block_search`].
    pub fn binary_search_block(
        &self,
        offset: usize,
        shl: u32,
        value: i64,
        direction: ScanDirection,
    ) -> isize {
        let len = self.len();
        self.with_buffer(|buffer| {
            block_search::binary_search_block(buffer.slots(), len, offset, shl, value, direction)
        })
    }

    // =========================================================================
    // Writes (writer thread only)
    // =========================================================================

    pub fn set(&self, index: usize, value: i64) -> Result<()> {
        let _write = self.lock.write();
        let len = self.len();
        if index >= len {
            return Err(ListError::OutOfRange { index, len });
        }
        self.with_buffer(|buffer| buffer.store(index, value));
        Ok(())
    }

    /// Write without a bounds check.
    ///
    /// # Safety
    ///
    /// `index` must be less than `len()`.
    #[inline]
    pub unsafe fn set_unchecked(&self, index: usize, value: i64) {
        debug_assert!(index < self.len());
        let _write = self.lock.write();
        self.with_buffer(|buffer| unsafe { buffer.store_unchecked(index, value) });
    }

    pub fn push(&self, value: i64) -> Result<()> {
        self.extend_from_slice(&[value])
    }

    /// Append `values` in a single write.
    pub fn extend_from_slice(&self, values: &[i64]) -> Result<()> {
        let _write = self.lock.write();
        let len = self.len();
        let new_len = len.saturating_add(values.len());
        self.ensure_capacity(new_len)?;
        self.with_buffer(|buffer| {
            for (i, v) in values.iter().enumerate() {
                buffer.store(len + i, *v);
            }
        });
        self.size.store(new_len, Ordering::Relaxed);
        Ok(())
    }

    /// Open a gap of `length` no-entry slots at `at`, shifting `[at, len)`
    /// right.
    pub fn insert(&self, at: usize, length: usize) -> Result<()> {
        let _write = self.lock.write();
        let len = self.len();
        if at > len {
            return Err(ListError::OutOfRange { index: at, len });
        }
        let new_len = len.saturating_add(length);
        self.ensure_capacity(new_len)?;
        self.with_buffer(|buffer| {
            buffer.copy_within(at, at + length, len - at);
            buffer.fill(at, at + length, self.no_entry_value);
        });
        self.size.store(new_len, Ordering::Relaxed);
        Ok(())
    }

    /// Copy `length` slots from `src` to `dst` within the buffer, like
    /// `memmove`. Both ranges must lie within `capacity()`.
    pub fn array_copy(&self, src: usize, dst: usize, length: usize) -> Result<()> {
        let _write = self.lock.write();
        self.with_buffer(|buffer| {
            let capacity = buffer.capacity();
            for start in [src, dst] {
                let end = start.saturating_add(length);
                if end > capacity {
                    return Err(ListError::OutOfRange {
                        index: end,
                        len: capacity,
                    });
                }
            }
            buffer.copy_within(src, dst, length);
            Ok(())
        })
    }

    /// Set the logical length, growing capacity if needed. Slots exposed by
    /// a longer length hold the no-entry value.
    pub fn set_logical_size(&self, size: usize) -> Result<()> {
        let _write = self.lock.write();
        self.ensure_capacity(size)?;
        let len = self.len();
        if size > len {
            self.with_buffer(|buffer| buffer.fill(len, size, self.no_entry_value));
        }
        self.size.store(size, Ordering::Relaxed);
        Ok(())
    }

    /// Reset the length to zero. Capacity is kept.
    pub fn clear(&self) {
        let _write = self.lock.write();
        self.size.store(0, Ordering::Relaxed);
    }

    // =========================================================================
    // Snapshots (any thread)
    // =========================================================================

    /// A reader with its own reusable snapshot cache.
    pub fn reader(&self) -> SnapshotReader<'_, G> {
        SnapshotReader::new(self)
    }

    /// A freshly allocated, independently owned snapshot.
    pub fn to_snapshot(&self) -> Snapshot {
        let mut snapshot = Snapshot::empty(self.no_entry_value);
        let stamp = self.lock.acquire_read();
        self.capture(stamp, &mut snapshot);
        snapshot
    }

    /// Copy the list into `snapshot`, starting from an already acquired
    /// `stamp`, until the copy validates. Returns the number of retries.
    pub(crate) fn capture(&self, mut stamp: u64, snapshot: &mut Snapshot) -> usize {
        let mut retries = 0;
        loop {
            self.with_buffer(|buffer| buffer.copy_to(&mut snapshot.data));
            snapshot.size = self.size.load(Ordering::Relaxed);

            if self.lock.validate_read(stamp) {
                snapshot.stamp = stamp;
                return retries;
            }

            retries += 1;
            stamp = self.lock.acquire_read();
        }
    }

    // =========================================================================
    // Internal
    // =========================================================================

    #[inline]
    fn with_buffer<R>(&self, f: impl FnOnce(&Buffer) -> R) -> R {
        let _pin = G::pin();
        // Safety: buffers are only released through the guard after being
        // replaced, and the pin keeps a replaced buffer alive.
        let buffer = unsafe { &*self.buffer.load(Ordering::Acquire) };
        f(buffer)
    }

    // Must run inside a write bracket.
    fn ensure_capacity(&self, required: usize) -> Result<()> {
        debug_assert!(self.lock.is_write_locked());
        if required > MAX_CAPACITY {
            return Err(ListError::InvalidCapacity { requested: required });
        }

        let _pin = G::pin();
        let current_ptr = self.buffer.load(Ordering::Acquire);
        // Safety: only the writer replaces buffers, and we are the writer.
        let current = unsafe { &*current_ptr };
        let capacity = current.capacity();
        if required <= capacity {
            return Ok(());
        }

        let new_capacity = capacity.saturating_mul(2).min(MAX_CAPACITY).max(required);
        let grown = Box::new(current.grown(new_capacity, self.no_entry_value));
        self.buffer.store(Box::into_raw(grown), Ordering::Release);
        log::trace!("list capacity grown from {} to {}", capacity, new_capacity);

        unsafe {
            self.guard.defer_destroy(current_ptr, drop_buffer);
        }
        Ok(())
    }
}

impl<G: Guard> Default for SnapshottableList<G> {
    fn default() -> Self {
        Self::with_options(ListOptions::default())
    }
}

impl<G: Guard> Drop for SnapshottableList<G> {
    fn drop(&mut self) {
        let ptr = *self.buffer.get_mut();
        // Safety: `&mut self` means no reader is left, and the current buffer
        // was never handed to the guard.
        unsafe { drop_buffer(ptr) };
    }
}

impl<G: Guard> fmt::Display for SnapshottableList<G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let len = self.len();
        self.with_buffer(|buffer| {
            snapshot::write_elements(f, buffer.slots()[..len].iter().map(|s| s.load(Ordering::Relaxed)))
        })
    }
}

impl<G: Guard> fmt::Debug for SnapshottableList<G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SnapshottableList")
            .field("len", &self.len())
            .field("capacity", &self.capacity())
            .field("stamp", &self.lock.stamp())
            .field("no_entry_value", &self.no_entry_value)
            .finish()
    }
}
