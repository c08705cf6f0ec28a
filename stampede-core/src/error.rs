use thiserror::Error;

pub type Result<T> = std::result::Result<T, ListError>;

/// Errors surfaced by the bounds-checked list and snapshot operations.
///
/// Both variants are synchronous and never retried internally.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListError {
    #[error("index {index} is out of range for length {len}")]
    OutOfRange { index: usize, len: usize },

    #[error("invalid capacity {requested}, possible integer overflow")]
    InvalidCapacity { requested: usize },
}
