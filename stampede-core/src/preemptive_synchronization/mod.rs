//! Thread-level (preemptive) synchronization primitives.

pub mod stamped_spin_lock;

pub use stamped_spin_lock::{StampedSpinLock, WriteGuard};
