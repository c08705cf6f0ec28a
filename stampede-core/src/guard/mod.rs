//! Guard trait for reclaiming retired backing buffers.
//!
//! Growing a list swaps in a larger buffer while readers may still be copying
//! the old one. The old buffer is handed to the list's `Guard`, which frees it
//! once no pinned reader can observe it.
//!
//! ```text
//! SnapshottableList<G: Guard>
//!     │
//!     ├── SnapshottableList<DeferredGuard>   (default, frees on list drop)
//!     └── SnapshottableList<EpochGuard>      (stampede-crossbeam)
//! ```

mod deferred_guard;

pub use deferred_guard::DeferredGuard;

/// A memory reclamation strategy for retired buffers.
///
/// # Safety Contract
///
/// Implementations must ensure:
/// 1. Pointers passed to `defer_destroy` are not freed while any `ReadGuard`
///    pinned before the retirement is alive
/// 2. Every deferred pointer is eventually released exactly once
///
/// The guard stored in a list schedules destruction. Pinning happens per
/// operation, not when the guard is created.
pub trait Guard: Sized + Default + Send + Sync {
    /// An active guard that protects buffer reads for its lifetime.
    ///
    /// Deferred guards use `()` since the stored guard outlives all readers.
    type ReadGuard: Sized;

    /// Pin an active read guard.
    fn pin() -> Self::ReadGuard;

    /// Schedule a retired allocation for deferred destruction.
    ///
    /// # Safety
    ///
    /// - `ptr` must be a valid pointer owned by the caller
    /// - `ptr` must no longer be reachable by new readers
    /// - `dealloc` must be the correct deallocation function for `ptr`
    unsafe fn defer_destroy<N>(&self, ptr: *mut N, dealloc: unsafe fn(*mut N));
}
