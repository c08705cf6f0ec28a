//! Crossbeam-based reclamation for stampede lists.
//!
//! This crate provides `EpochGuard`, an implementation of the `Guard` trait
//! using crossbeam-epoch to free buffers replaced by list growth.
//!
//! # Usage
//!
//! ```ignore
//! use stampede_core::SnapshottableList;
//! use stampede_crossbeam::EpochGuard;
//!
//! let list: SnapshottableList<EpochGuard> = SnapshottableList::new(16, -1);
//! list.push(42).unwrap();
//! ```

pub mod epoch_guard;

pub use epoch_guard::EpochGuard;

use stampede_core::{SnapshotReader, SnapshottableList};

/// A snapshottable list that reclaims retired buffers through crossbeam-epoch.
pub type EpochSnapshottableList = SnapshottableList<EpochGuard>;

/// A snapshot reader over an [`EpochSnapshottableList`].
pub type EpochSnapshotReader<'a> = SnapshotReader<'a, EpochGuard>;
