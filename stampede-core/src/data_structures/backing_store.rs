//! Fixed-capacity slot buffer behind a snapshottable list.
//!
//! Slots are `AtomicI64` so that a reader copying the buffer while the writer
//! mutates it performs a torn (and later discarded) read rather than a data
//! race. All slot accesses are `Relaxed`; ordering comes from the stamp.
//!
//! A buffer never changes capacity. Growth builds a new buffer, copies the
//! old contents into it and retires the old one through the list's guard.

use std::sync::atomic::{AtomicI64, Ordering};

pub(crate) struct Buffer {
    slots: Box<[AtomicI64]>,
}

impl Buffer {
    pub(crate) fn filled(capacity: usize, value: i64) -> Self {
        Buffer {
            slots: (0..capacity).map(|_| AtomicI64::new(value)).collect(),
        }
    }

    /// A new buffer of `capacity` slots holding a copy of `self`, padded with
    /// `fill`.
    pub(crate) fn grown(&self, capacity: usize, fill: i64) -> Self {
        debug_assert!(capacity >= self.capacity());
        let slots = self
            .slots
            .iter()
            .map(|slot| AtomicI64::new(slot.load(Ordering::Relaxed)))
            .chain((self.capacity()..capacity).map(|_| AtomicI64::new(fill)))
            .collect();
        Buffer { slots }
    }

    #[inline]
    pub(crate) fn capacity(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub(crate) fn slots(&self) -> &[AtomicI64] {
        &self.slots
    }

    #[inline]
    pub(crate) fn load(&self, index: usize) -> i64 {
        self.slots[index].load(Ordering::Relaxed)
    }

    /// # Safety
    ///
    /// `index` must be less than `capacity()`.
    #[inline]
    pub(crate) unsafe fn load_unchecked(&self, index: usize) -> i64 {
        unsafe { self.slots.get_unchecked(index) }.load(Ordering::Relaxed)
    }

    #[inline]
    pub(crate) fn store(&self, index: usize, value: i64) {
        self.slots[index].store(value, Ordering::Relaxed);
    }

    /// # Safety
    ///
    /// `index` must be less than `capacity()`.
    #[inline]
    pub(crate) unsafe fn store_unchecked(&self, index: usize, value: i64) {
        unsafe { self.slots.get_unchecked(index) }.store(value, Ordering::Relaxed);
    }

    pub(crate) fn fill(&self, from: usize, to: usize, value: i64) {
        for slot in &self.slots[from..to] {
            slot.store(value, Ordering::Relaxed);
        }
    }

    /// Copy `length` slots from `src` to `dst`. The ranges may overlap.
    pub(crate) fn copy_within(&self, src: usize, dst: usize, length: usize) {
        debug_assert!(src + length <= self.capacity());
        debug_assert!(dst + length <= self.capacity());

        if dst > src {
            // Overlapping shift to the right must run back to front.
            for i in (0..length).rev() {
                self.store(dst + i, self.load(src + i));
            }
        } else if dst < src {
            for i in 0..length {
                self.store(dst + i, self.load(src + i));
            }
        }
    }

    /// Copy every slot into `out`, reallocating `out` only if its length
    /// differs from the buffer capacity.
    pub(crate) fn copy_to(&self, out: &mut Vec<i64>) {
        if out.len() != self.capacity() {
            *out = vec![0; self.capacity()];
        }
        for (dst, slot) in out.iter_mut().zip(self.slots.iter()) {
            *dst = slot.load(Ordering::Relaxed);
        }
    }
}

/// Deallocation function handed to the list's guard.
///
/// # Safety
///
/// `ptr` must come from `Box::into_raw` and must not be used afterwards.
pub(crate) unsafe fn drop_buffer(ptr: *mut Buffer) {
    drop(unsafe { Box::from_raw(ptr) });
}
