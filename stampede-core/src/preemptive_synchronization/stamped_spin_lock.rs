//! Single-writer stamped spin lock.
//!
//! The lock is a monotonic 64-bit counter whose parity encodes the writer state:
//!
//! ```text
//!   stamp:   0 ──acquire_write──► 1 ──release_write──► 2 ──► 3 ──► 4 ...
//!            even                 odd                  even
//!            (available)          (write in progress)  (available)
//! ```
//!
//! Readers never block the writer. A reader takes an optimistic stamp with
//! [`StampedSpinLock::acquire_read`], reads the protected data, then calls
//! [`StampedSpinLock::validate_read`]. If the stamp moved, the read may be torn
//! and must be discarded and retried.
//!
//! # Memory Ordering
//!
//! ```text
//!   writer                               reader
//!   ──────                               ──────
//!   cas(even -> odd, Acquire)            s1 = stamp.load(Acquire)   (spin while odd)
//!   fence(Release)                       ... relaxed data loads ...
//!   ... relaxed data stores ...          fence(Acquire)
//!   cas(odd -> even, Release)            s2 = stamp.load(Relaxed)
//!                                        valid iff s1 == s2
//! ```
//!
//! # Contract
//!
//! At most one write critical section may be open at a time. The lock is not
//! reentrant and writers never wait for each other: `acquire_write` on a
//! locked stamp, or `release_write` on an unlocked one, panics in every build.
//! A panicking caller has not touched the stamp, so the holder's critical
//! section is unaffected.

use std::sync::atomic::{AtomicU64, Ordering, fence};

use crossbeam::utils::Backoff;

/// Optimistic stamped lock for one writer and any number of readers.
#[derive(Debug, Default)]
pub struct StampedSpinLock {
    stamp: AtomicU64,
}

impl StampedSpinLock {
    pub fn new() -> Self {
        StampedSpinLock {
            stamp: AtomicU64::new(0),
        }
    }

    /// Spin until no write is in progress and return the (even) stamp.
    ///
    /// There is no sleep, yield or timeout. A reader facing a writer that never
    /// leaves its critical section spins forever.
    #[inline]
    pub fn acquire_read(&self) -> u64 {
        let backoff = Backoff::new();
        loop {
            let stamp = self.stamp.load(Ordering::Acquire);
            if is_write_lock_available(stamp) {
                return stamp;
            }
            backoff.spin();
        }
    }

    /// Returns true if no write happened since `stamp` was acquired.
    #[inline]
    pub fn validate_read(&self, stamp: u64) -> bool {
        fence(Ordering::Acquire);
        self.stamp.load(Ordering::Relaxed) == stamp
    }

    /// Enter the write critical section. The stamp becomes odd.
    ///
    /// # Panics
    ///
    /// Panics if a write is already in progress, from this thread or another.
    #[inline]
    pub fn acquire_write(&self) {
        let stamp = self.stamp.load(Ordering::Relaxed);
        let acquired = is_write_lock_available(stamp)
            && self
                .stamp
                .compare_exchange(
                    stamp,
                    stamp.wrapping_add(1),
                    Ordering::Acquire,
                    Ordering::Relaxed,
                )
                .is_ok();
        if !acquired {
            panic!("write lock already held");
        }
        fence(Ordering::Release);
    }

    /// Leave the write critical section. The stamp becomes even again.
    ///
    /// # Panics
    ///
    /// Panics if no write is in progress.
    #[inline]
    pub fn release_write(&self) {
        let stamp = self.stamp.load(Ordering::Relaxed);
        let released = !is_write_lock_available(stamp)
            && self
                .stamp
                .compare_exchange(
                    stamp,
                    stamp.wrapping_add(1),
                    Ordering::Release,
                    Ordering::Relaxed,
                )
                .is_ok();
        if !released {
            panic!("write lock not held");
        }
    }

    /// Acquire the write lock for the lifetime of the returned guard.
    #[inline]
    pub fn write(&self) -> WriteGuard<'_> {
        self.acquire_write();
        WriteGuard { lock: self }
    }

    /// Raw counter value. Only meaningful for diagnostics.
    pub fn stamp(&self) -> u64 {
        self.stamp.load(Ordering::Acquire)
    }

    pub fn is_write_locked(&self) -> bool {
        !is_write_lock_available(self.stamp())
    }
}

/// Releases the write lock on drop, including on early `?` returns.
#[must_use = "the write lock is released as soon as the guard is dropped"]
pub struct WriteGuard<'a> {
    lock: &'a StampedSpinLock,
}

impl Drop for WriteGuard<'_> {
    fn drop(&mut self) {
        self.lock.release_write();
    }
}

#[inline]
fn is_write_lock_available(stamp: u64) -> bool {
    stamp & 1 == 0
}
