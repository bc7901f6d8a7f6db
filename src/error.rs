//! Error types for table construction and evaluation.
use std::path::PathBuf;

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, TableError>;

/// Errors while building, decoding, or evaluating a table.
///
/// Construction either succeeds completely or returns one of these;
/// no partially-valid table is ever produced.
#[derive(Debug, Error)]
pub enum TableError {
    /// The delimited text file could not be opened or read
    #[error("failed to read `{}`: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Encoded rank is not an integer in `[1, MAX_RANK]`
    #[error("rank must be an integer in the range [1, 32], got {value}")]
    InvalidRank { value: f64 },

    /// Encoded rank differs from the number of inputs the caller declared
    #[error("rank must match the number of inputs: expected {expected} but was {found}")]
    RankMismatch { expected: usize, found: usize },

    /// A dimension is not an integer >= 1
    #[error("size of dimension {axis} must be an integer >= 1, got {value}")]
    InvalidDimension { axis: usize, value: f64 },

    /// Buffer is too short to hold its own header
    #[error("buffer has {len} elements but at least {required} are required")]
    InvalidSize { len: usize, required: usize },

    /// Buffer length disagrees with the length implied by its header
    #[error("buffer has the wrong number of elements for its dimensions: expected {expected} but was {found}")]
    SizeMismatch { expected: usize, found: usize },

    /// Product of axis lengths differs from the length of the data block
    #[error("product of breakpoint counts is {expected} but the data block has {found} elements")]
    DimensionProductMismatch { expected: usize, found: usize },

    /// Malformed numeric token in strict parsing mode
    #[error("cannot parse `{token}` at row {row}, column {column} as a number")]
    Parse {
        row: usize,
        column: usize,
        token: String,
    },

    #[error("evaluation failed: {0}")]
    Evaluation(#[from] EvaluationError),
}

/// Failures reported by the interpolation kernel.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvaluationError {
    #[error("expected {expected} coordinates but got {found}")]
    DimensionMismatch { expected: usize, found: usize },

    #[error("coordinate on axis {axis} is not a number")]
    NotFinite { axis: usize },

    /// Raised under `ExtrapMethod::Reject` only
    #[error("coordinate {value} on axis {axis} is outside the table range [{min}, {max}]")]
    OutOfRange {
        axis: usize,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("breakpoints on axis {axis} are not strictly increasing at index {index}")]
    NonMonotonic { axis: usize, index: usize },

    #[error("unknown {kind} method code {code}")]
    UnknownMethod { kind: &'static str, code: i32 },
}
