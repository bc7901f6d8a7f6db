//! Assemble tables from breakpoint and value arrays.
//!
//! Arrays can come straight from the caller or from columns of a delimited
//! text file, in any mix:
//!
//! ```rust,no_run
//! use ndtable::{build_from_columns, ExtrapMethod, InterpMethod, Source};
//!
//! // Breakpoints of axis 0 from column 1, axis 1 given inline, data from column 2
//! let y = [0.0, 10.0, 20.0];
//! let table = build_from_columns(
//!     "table.csv",
//!     Source::Column(2),
//!     &[Source::Column(1), Source::Array(&y)],
//! )?;
//! let v = table.evaluate(&[0.5, 5.0], InterpMethod::Linear, ExtrapMethod::Hold)?;
//! # Ok::<(), ndtable::TableError>(())
//! ```
use std::borrow::Cow;
use std::path::Path;

use log::debug;

use crate::codec;
use crate::csv::{CsvFile, CsvOptions};
use crate::error::{Result, TableError};
use crate::table::NdTable;

/// Where one array of a table comes from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Source<'a> {
    /// Values supplied by the caller
    Array(&'a [f64]),
    /// 1-based column of the source file
    Column(usize),
}

/// Build a table from one breakpoint array per axis and a row-major data block.
///
/// # Errors
/// * `DimensionProductMismatch` if `data` does not hold one value per grid point
/// * Any validation error from [`codec::decode`]
pub fn build_from_raw_arrays(axes: &[&[f64]], data: &[f64]) -> Result<NdTable> {
    let expected = axes
        .iter()
        .try_fold(1_usize, |acc, a| acc.checked_mul(a.len()))
        .unwrap_or(usize::MAX);
    if expected != data.len() {
        return Err(TableError::DimensionProductMismatch {
            expected,
            found: data.len(),
        });
    }

    let buffer = codec::assemble(axes, data);
    codec::decode(axes.len(), &buffer)
}

/// Build a one-dimensional table from breakpoints `x` and values `y`.
///
/// # Errors
/// * Same as [`build_from_raw_arrays`]
pub fn build_1d(x: &[f64], y: &[f64]) -> Result<NdTable> {
    build_from_raw_arrays(&[x], y)
}

/// Build a table with data and breakpoints drawn from caller arrays or from
/// columns of the file at `path`, read with default options.
///
/// # Errors
/// * `Io` if the file is needed and cannot be read
/// * Same as [`build_from_raw_arrays`]
pub fn build_from_columns(
    path: impl AsRef<Path>,
    data: Source<'_>,
    breakpoints: &[Source<'_>],
) -> Result<NdTable> {
    build_from_columns_with(path, &CsvOptions::default(), data, breakpoints)
}

/// [`build_from_columns`] with explicit reader options.
///
/// The file is only opened if at least one source is a column, and all
/// columns are read through the same handle.
///
/// # Errors
/// * `Io` if the file is needed and cannot be read
/// * `Parse` on a malformed token in strict mode
/// * Same as [`build_from_raw_arrays`]
pub fn build_from_columns_with<'a>(
    path: impl AsRef<Path>,
    options: &CsvOptions,
    data: Source<'a>,
    breakpoints: &[Source<'a>],
) -> Result<NdTable> {
    let path = path.as_ref();
    let mut file: Option<CsvFile> = None;

    let mut resolve = |source: Source<'a>| -> Result<Cow<'a, [f64]>> {
        match source {
            Source::Array(values) => Ok(Cow::Borrowed(values)),
            Source::Column(column) => {
                let handle = match file.as_mut() {
                    Some(handle) => handle,
                    None => file.insert(CsvFile::open_with(path, options.clone())?),
                };
                let values = handle.column(column)?;
                debug!(
                    "read {} values from column {column} of {}",
                    values.len(),
                    path.display()
                );
                Ok(Cow::Owned(values))
            }
        }
    };

    let values = resolve(data)?;
    let axes = breakpoints
        .iter()
        .map(|&s| resolve(s))
        .collect::<Result<Vec<_>>>()?;

    if let Some(handle) = file {
        handle.close();
    }

    let axes_ref: Vec<&[f64]> = axes.iter().map(|a| &a[..]).collect();
    build_from_raw_arrays(&axes_ref, &values)
}
