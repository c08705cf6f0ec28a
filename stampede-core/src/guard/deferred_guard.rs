//! Deferred guard implementation.
//!
//! This module provides `DeferredGuard`, which holds every retired buffer until
//! the guard itself is dropped together with its list.

#[cfg(debug_assertions)]
use std::collections::HashSet;
use std::sync::Mutex;

use super::Guard;

/// A guard that defers all destruction until the guard is dropped.
///
/// Readers always hold a reference to the list, and the list owns the guard,
/// so nothing retired here can be freed under a reader. With geometric
/// growth the retired buffers add up to less than the live capacity.
///
/// # Thread Safety
///
/// Retirements are collected behind a `Mutex`. Only the writer retires
/// buffers, so the mutex is uncontended in practice.
pub struct DeferredGuard {
    deferred: Mutex<Vec<DeferredAllocation>>,
    #[cfg(debug_assertions)]
    seen: Mutex<HashSet<usize>>,
}

struct DeferredAllocation {
    ptr: *mut (),
    dealloc: unsafe fn(*mut ()),
}

// Safety: the pointer is only dereferenced by `dealloc` when the guard drops.
unsafe impl Send for DeferredAllocation {}

impl DeferredGuard {
    pub fn new() -> Self {
        DeferredGuard {
            deferred: Mutex::new(Vec::new()),
            #[cfg(debug_assertions)]
            seen: Mutex::new(HashSet::new()),
        }
    }

    /// Number of allocations waiting for the guard to drop.
    pub fn pending(&self) -> usize {
        self.deferred.lock().map(|d| d.len()).unwrap_or_default()
    }
}

impl Default for DeferredGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for DeferredGuard {
    fn drop(&mut self) {
        let allocations = match self.deferred.get_mut() {
            Ok(allocations) => allocations,
            Err(poisoned) => poisoned.into_inner(),
        };

        for allocation in allocations.drain(..) {
            unsafe {
                (allocation.dealloc)(allocation.ptr);
            }
        }
    }
}

impl Guard for DeferredGuard {
    /// Nothing to pin: the stored guard outlives every reader.
    type ReadGuard = ();

    fn pin() -> Self::ReadGuard {}

    unsafe fn defer_destroy<N>(&self, ptr: *mut N, dealloc: unsafe fn(*mut N)) {
        #[cfg(debug_assertions)]
        {
            let addr = ptr as usize;
            let mut seen = self.seen.lock().unwrap_or_else(|e| e.into_inner());
            assert!(seen.insert(addr), "DUPLICATE defer_destroy at {:#x}", addr);
        }

        let allocation = DeferredAllocation {
            ptr: ptr as *mut (),
            dealloc: unsafe {
                std::mem::transmute::<unsafe fn(*mut N), unsafe fn(*mut ())>(dealloc)
            },
        };
        self.deferred
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(allocation);
    }
}
