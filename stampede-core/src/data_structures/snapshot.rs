//! Point-in-time copies of a snapshottable list.
//!
//! A [`Snapshot`] is an independently owned copy of a list's buffer and
//! logical length, taken while no write was in progress. A [`SnapshotReader`]
//! keeps one snapshot per reader and only recopies it when the list's stamp
//! has moved:
//!
//! ```text
//!   reader.snapshot()
//!         │
//!         ▼
//!   stamp = acquire_read()  (spins while a write is in progress)
//!         │
//!         ├── stamp == cached stamp ──► return cached snapshot (no copy)
//!         │
//!         ▼
//!   copy buffer + length ◄──────────┐
//!         │                         │
//!         ▼                         │ stamp moved:
//!   validate_read(stamp) ── false ──┘ discard copy, re-acquire
//!         │ true
//!         ▼
//!   record stamp, return snapshot
//! ```
//!
//! The retry loop is unbounded. Under sustained writes a reader can livelock;
//! writer critical sections are expected to be short.

use std::fmt;
use std::hash::{Hash, Hasher};

use crate::error::{ListError, Result};
use crate::guard::{DeferredGuard, Guard};

use super::SnapshottableList;
use super::block_search::{self, ScanDirection};

/// A torn-free copy of a list's contents at some past instant.
#[derive(Clone)]
pub struct Snapshot {
    pub(crate) data: Vec<i64>,
    pub(crate) size: usize,
    pub(crate) no_entry_value: i64,
    pub(crate) stamp: u64,
}

impl Snapshot {
    pub(crate) fn empty(no_entry_value: i64) -> Self {
        Snapshot {
            data: Vec::new(),
            size: 0,
            no_entry_value,
            stamp: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Capacity of the source buffer when the snapshot was taken.
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// Stamp of the list at the instant this snapshot reflects.
    pub fn stamp(&self) -> u64 {
        self.stamp
    }

    pub fn no_entry_value(&self) -> i64 {
        self.no_entry_value
    }

    pub fn get(&self, index: usize) -> Result<i64> {
        if index < self.size {
            Ok(self.data[index])
        } else {
            Err(ListError::OutOfRange {
                index,
                len: self.size,
            })
        }
    }

    /// # Safety
    ///
    /// `index` must be less than `capacity()`.
    #[inline]
    pub unsafe fn get_unchecked(&self, index: usize) -> i64 {
        debug_assert!(index < self.data.len());
        unsafe { *self.data.get_unchecked(index) }
    }

    pub fn as_slice(&self) -> &[i64] {
        &self.data[..self.size]
    }

    pub fn iter(&self) -> impl Iterator<Item = i64> + '_ {
        self.as_slice().iter().copied()
    }

    pub fn index_of(&self, value: i64) -> Option<usize> {
        self.as_slice().iter().position(|v| *v == value)
    }

    /// Block binary search over the snapshot. See [`block_search`].
    pub fn binary_search_block(
        &self,
        offset: usize,
        shl: u32,
        value: i64,
        direction: ScanDirection,
    ) -> isize {
        block_search::binary_search_block(
            &self.data[..],
            self.size,
            offset,
            shl,
            value,
            direction,
        )
    }
}

impl PartialEq for Snapshot {
    fn eq(&self, other: &Self) -> bool {
        self.no_entry_value == other.no_entry_value && self.as_slice() == other.as_slice()
    }
}

impl Eq for Snapshot {}

impl Hash for Snapshot {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.size.hash(state);
        for v in self.iter() {
            let v = if v == self.no_entry_value { 0 } else { v };
            v.hash(state);
        }
    }
}

impl fmt::Display for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_elements(f, self.iter())
    }
}

impl fmt::Debug for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Snapshot")
            .field("stamp", &self.stamp)
            .field("capacity", &self.capacity())
            .field("elements", &self.as_slice())
            .finish()
    }
}

pub(crate) fn write_elements(
    f: &mut fmt::Formatter<'_>,
    elements: impl Iterator<Item = i64>,
) -> fmt::Result {
    f.write_str("[")?;
    for (i, v) in elements.enumerate() {
        if i > 0 {
            f.write_str(",")?;
        }
        write!(f, "{}", v)?;
    }
    f.write_str("]")
}

/// Per-reader snapshot cache over a shared list.
///
/// Each reader thread creates its own `SnapshotReader`. The returned borrow is
/// invalidated by the next call to [`SnapshotReader::snapshot`].
pub struct SnapshotReader<'a, G: Guard = DeferredGuard> {
    list: &'a SnapshottableList<G>,
    snapshot: Option<Snapshot>,
    refreshes: u64,
}

impl<'a, G: Guard> SnapshotReader<'a, G> {
    pub(crate) fn new(list: &'a SnapshottableList<G>) -> Self {
        SnapshotReader {
            list,
            snapshot: None,
            refreshes: 0,
        }
    }

    /// Returns a consistent snapshot, recopying only if the list changed since
    /// the previous call.
    pub fn snapshot(&mut self) -> &Snapshot {
        let list = self.list;
        let stamp = list.lock().acquire_read();
        let fresh = self.snapshot.as_ref().is_some_and(|s| s.stamp == stamp);

        let snapshot = self
            .snapshot
            .get_or_insert_with(|| Snapshot::empty(list.no_entry_value()));

        if !fresh {
            let retries = list.capture(stamp, snapshot);
            self.refreshes += 1;
            if retries > 0 {
                log::debug!(
                    "snapshot at stamp {} needed {} retries",
                    snapshot.stamp,
                    retries
                );
            }
        }

        snapshot
    }

    /// Number of times the cached snapshot was recopied.
    pub fn refreshes(&self) -> u64 {
        self.refreshes
    }

    pub fn list(&self) -> &'a SnapshottableList<G> {
        self.list
    }
}
