//! Single-writer, multi-reader snapshottable list of `i64`.
//!
//! One writer thread mutates a [`SnapshottableList`] while any number of
//! reader threads take torn-free [`Snapshot`]s without ever blocking it. The
//! only synchronization is a [`StampedSpinLock`]. Grouped records stored as
//! fixed-size blocks are searched with [`binary_search_block`].
//!
//! ```rust
//! use stampede_core::{ScanDirection, SnapshottableList};
//!
//! let list: SnapshottableList = SnapshottableList::new(2, -1);
//! list.extend_from_slice(&[10, 100, 20, 200, 30, 300]).unwrap();
//!
//! let mut reader = list.reader();
//! let snapshot = reader.snapshot();
//! assert_eq!(snapshot.binary_search_block(0, 1, 20, ScanDirection::Up), 2);
//! assert_eq!(snapshot.to_string(), "[10,100,20,200,30,300]");
//! ```

pub mod common_tests;
pub mod data_structures;
pub mod error;
pub mod guard;
pub mod preemptive_synchronization;

pub use data_structures::{
    BlockKeys, ListOptions, MAX_CAPACITY, ScanDirection, Snapshot, SnapshotReader,
    SnapshottableList, binary_search_block,
};
pub use error::{ListError, Result};
pub use guard::{DeferredGuard, Guard};
pub use preemptive_synchronization::{StampedSpinLock, WriteGuard};
