/// Default initial capacity of a list, in elements.
pub const DEFAULT_CAPACITY: usize = 16;

/// Default value used for gaps and absence.
pub const DEFAULT_NO_ENTRY_VALUE: i64 = -1;

/// Construction options for a [`SnapshottableList`](super::SnapshottableList).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListOptions {
    /// Number of slots allocated up front.
    ///
    /// Default: 16
    pub initial_capacity: usize,

    /// Value written into slots opened by `insert`, growth and
    /// `set_logical_size`.
    ///
    /// Default: -1
    pub no_entry_value: i64,
}

impl ListOptions {
    pub fn with_initial_capacity(mut self, initial_capacity: usize) -> Self {
        self.initial_capacity = initial_capacity;
        self
    }

    pub fn with_no_entry_value(mut self, no_entry_value: i64) -> Self {
        self.no_entry_value = no_entry_value;
        self
    }
}

impl Default for ListOptions {
    fn default() -> Self {
        Self {
            initial_capacity: DEFAULT_CAPACITY,
            no_entry_value: DEFAULT_NO_ENTRY_VALUE,
        }
    }
}
