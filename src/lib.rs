//! N-dimensional lookup tables.
//!
//! A table holds one strictly increasing breakpoint axis per dimension and a
//! row-major block of values at every grid point. Tables are created from a
//! flat `f64` buffer, from caller arrays, or from columns of a delimited text
//! file, and evaluated at arbitrary points with a choice of interpolation and
//! extrapolation along every axis.
//!
//! | Interpolation    | Continuity | Monotone |
//! |------------------|------------|----------|
//! | `Hold`           | C-1        | yes      |
//! | `Nearest`        | C-1        | yes      |
//! | `Linear`         | C0         | yes      |
//! | `Akima`          | C1         | no       |
//! | `FritschButland` | C1         | yes      |
//! | `Steffen`        | C1         | yes      |
//!
//! Extrapolation either holds the end value, continues linearly with the
//! interpolant's end slope, or rejects the point.
//!
//! ```rust
//! use ndtable::{open, ExtrapMethod, InterpMethod};
//!
//! // rank 2, dims [2, 3], axes, then z(x0, y0), z(x0, y1), ...
//! let buffer = [
//!     2.0, 2.0, 3.0,
//!     0.0, 1.0,
//!     0.0, 10.0, 20.0,
//!     1.0, 2.0, 3.0, 4.0, 5.0, 6.0,
//! ];
//! let table = open(2, &buffer).unwrap();
//!
//! assert_eq!(table.evaluate(&[0.0, 0.0], InterpMethod::Linear, ExtrapMethod::Hold).unwrap(), 1.0);
//! assert_eq!(table.evaluate(&[1.0, 20.0], InterpMethod::Linear, ExtrapMethod::Hold).unwrap(), 6.0);
//! assert!(table.evaluate(&[1.5, 0.0], InterpMethod::Linear, ExtrapMethod::Reject).is_err());
//! ```
// These "needless" range loops are a significant speedup
#![allow(clippy::needless_range_loop)]

pub mod builder;
pub mod codec;
pub mod csv;
pub mod error;
pub mod evaluate;
mod table;
pub mod utils;

#[cfg(test)]
pub(crate) mod testing;

pub use builder::{
    build_1d, build_from_columns, build_from_columns_with, build_from_raw_arrays, Source,
};
pub use csv::{CsvFile, CsvOptions, ParseMode};
pub use error::{EvaluationError, Result, TableError};
pub use evaluate::{ExtrapMethod, InterpMethod};
pub use table::NdTable;

/// Largest number of dimensions a table may have
pub const MAX_RANK: usize = 32;

/// Decode a flat buffer into a table, checking its rank against `ndims`.
///
/// See [`codec::decode`] for the layout and the checks performed.
pub fn open(ndims: usize, buffer: &[f64]) -> Result<NdTable> {
    codec::decode(ndims, buffer)
}
