//! Epoch-based guard implementation using crossbeam-epoch.
//!
//! This module provides `EpochGuard`, an implementation of the `Guard` trait
//! that retires replaced list buffers through the global crossbeam epoch
//! collector instead of holding them until the list drops.
//!
//! ```text
//! SnapshottableList<EpochGuard>
//!     │
//!     ├── readers pin an epoch while copying a buffer
//!     └── growth defers the old buffer past every pinned epoch
//! ```
//!
//! # Example
//!
//! ```rust
//! use stampede_crossbeam::EpochSnapshottableList;
//!
//! let list = EpochSnapshottableList::new(1, -1);
//! for i in 0..100 {
//!     list.push(i).unwrap();
//! }
//! assert_eq!(list.to_snapshot().len(), 100);
//! ```

use crossbeam_epoch::{self as epoch, Guard as CrossbeamGuard};
use stampede_core::guard::Guard;

/// Epoch-based reclamation guard.
///
/// Retired buffers are freed once every thread has advanced past the epoch in
/// which they were replaced.
///
/// # Performance
///
/// - **Pin overhead**: Very low (thread-local check), paid on every buffer access
/// - **Reclamation**: Batched by the global collector
/// - **Memory**: Old buffers are freed long before the list drops
///
#[derive(Clone, Copy, Debug, Default)]
pub struct EpochGuard {
    // Zero-sized - all state is in the global epoch collector
}

impl EpochGuard {
    pub fn new() -> Self {
        EpochGuard {}
    }
}

impl Guard for EpochGuard {
    /// A pinned crossbeam guard held for the duration of a buffer access.
    type ReadGuard = CrossbeamGuard;

    fn pin() -> Self::ReadGuard {
        epoch::pin()
    }

    unsafe fn defer_destroy<N>(&self, ptr: *mut N, dealloc: unsafe fn(*mut N)) {
        let guard = epoch::pin();
        unsafe {
            guard.defer_unchecked(move || {
                dealloc(ptr);
            });
        }
        // Hand the local bag to the global queue right away.
        guard.flush();
    }
}
