//! Error kinds shared by the frame, transform and clustering layers.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum MatcalcError {
    /// a label lookup missed the row / column index
    #[error("key not found: {0}")]
    KeyNotFound(String),

    #[error("shape mismatch: expected {expected}, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },

    #[error("positional index {index} is out of bounds for axis of length {len}")]
    IndexOutOfBounds { index: usize, len: usize },

    /// clustering / joining invoked on zero-length input
    #[error("empty input: {0}")]
    EmptyInput(String),

    #[error("invalid cluster count: k = {k}, but there are {n} items")]
    InvalidClusterCount { k: usize, n: usize },

    /// caller-side size caps (see `pipeline::MAX_CLUSTER_ITEMS`)
    #[error("cannot process {len} {axis}, the limit is {limit}")]
    LimitExceeded {
        axis: &'static str,
        len: usize,
        limit: usize,
    },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

pub type Result<T> = std::result::Result<T, MatcalcError>;
