//! Snapshottable data structures.
//!
//! # Organization
//!
//! - [`snapshottable_list`] - Single-writer `i64` list with optimistic snapshots
//! - [`snapshot`] - Snapshots and per-reader snapshot caches
//! - [`block_search`] - Binary search over fixed-size keyed blocks
//! - [`options`] - Construction options
//! - `backing_store` - Atomic slot buffer (pub(crate))

pub(crate) mod backing_store;
pub mod block_search;
pub mod options;
pub mod snapshot;
pub mod snapshottable_list;

pub use block_search::{BlockKeys, LINEAR_SCAN_THRESHOLD, ScanDirection, binary_search_block};
pub use options::{DEFAULT_CAPACITY, DEFAULT_NO_ENTRY_VALUE, ListOptions};
pub use snapshot::{Snapshot, SnapshotReader};
pub use snapshottable_list::{MAX_CAPACITY, SnapshottableList};
