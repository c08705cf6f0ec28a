//! Binary search over fixed-size blocks of `i64`.
//!
//! A block is a run of `2^shl` consecutive elements. Only the first element of
//! each block is the key; the remaining `2^shl - 1` elements are payload:
//!
//! ```text
//!   shl = 1, block size 2:
//!
//!   index:  0    1    2    3    4    5    6    7
//!          [10 | a ][20 | b ][30 | c ][30 | d ]
//!           key  payload
//! ```
//!
//! # Result Encoding
//!
//! A hit returns the element index of the matching block's key. A miss returns
//! `-(insertion_index + 1)`, where `insertion_index` is the element index at
//! which a block with the searched key would keep block keys ascending.
//!
//! Results, tie-breaks and miss encoding are bit-identical to the native
//! `binary_search` routine that shares this layout, so either side can search
//! structures built by the other. Keep the two in sync.

use std::sync::atomic::{AtomicI64, Ordering};

/// Below this many candidate blocks the search stops bisecting and scans.
///
/// A tuning constant; any value yields the same results.
pub const LINEAR_SCAN_THRESHOLD: isize = 65;

/// Which block wins among equal keys.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ScanDirection {
    /// Lowest-address block among equal keys.
    Up,
    /// Highest-address block among equal keys.
    Down,
}

/// Random access to the keys of a block layout.
pub trait BlockKeys {
    fn key_at(&self, index: usize) -> i64;
}

impl BlockKeys for [i64] {
    #[inline]
    fn key_at(&self, index: usize) -> i64 {
        self[index]
    }
}

impl BlockKeys for [AtomicI64] {
    #[inline]
    fn key_at(&self, index: usize) -> i64 {
        self[index].load(Ordering::Relaxed)
    }
}

/// Search the first `len` elements of `keys` for a block keyed `value`.
///
/// `offset` is an element index; blocks before `offset >> shl` are not
/// bisected. Block keys must be ascending.
pub fn binary_search_block<K>(
    keys: &K,
    len: usize,
    offset: usize,
    shl: u32,
    value: i64,
    direction: ScanDirection,
) -> isize
where
    K: BlockKeys + ?Sized,
{
    let search = BlockSearch { keys, shl };
    let mut low = (offset as isize) >> shl;
    let mut high = (len as isize - 1) >> shl;

    while high - low > LINEAR_SCAN_THRESHOLD {
        let mid = (low + high) >> 1;
        let mid_value = search.key(mid);

        if mid_value < value {
            low = mid;
        } else if mid_value > value {
            high = mid - 1;
        } else {
            return match direction {
                ScanDirection::Up => search.scroll_up(mid, mid_value),
                ScanDirection::Down => search.scroll_down(mid, high, mid_value),
            };
        }
    }

    match direction {
        ScanDirection::Up => search.scan_up(value, low, high + 1),
        ScanDirection::Down => search.scan_down(value, low, high + 1),
    }
}

struct BlockSearch<'a, K: ?Sized> {
    keys: &'a K,
    shl: u32,
}

impl<K: BlockKeys + ?Sized> BlockSearch<'_, K> {
    #[inline]
    fn key(&self, block: isize) -> i64 {
        self.keys.key_at((block << self.shl) as usize)
    }

    #[inline]
    fn not_found(&self, block: isize) -> isize {
        -((block << self.shl) + 1)
    }

    fn scan_up(&self, value: i64, low: isize, high: isize) -> isize {
        for block in low..high {
            let key = self.key(block);
            if key == value {
                return block << self.shl;
            }
            if key > value {
                return self.not_found(block);
            }
        }
        self.not_found(high)
    }

    fn scan_down(&self, value: i64, low: isize, high: isize) -> isize {
        for block in (low..high).rev() {
            let key = self.key(block);
            if key == value {
                return block << self.shl;
            }
            if key < value {
                return self.not_found(block + 1);
            }
        }
        self.not_found(low)
    }

    // Can walk below the bisection floor, same as the native routine.
    fn scroll_up(&self, mut high: isize, value: i64) -> isize {
        loop {
            if high > 0 {
                high -= 1;
            } else {
                return 0;
            }
            if self.key(high) != value {
                return (high + 1) << self.shl;
            }
        }
    }

    fn scroll_down(&self, mut low: isize, high: isize, value: i64) -> isize {
        loop {
            if low < high {
                low += 1;
            } else {
                return low << self.shl;
            }
            if self.key(low) != value {
                return (low - 1) << self.shl;
            }
        }
    }
}
