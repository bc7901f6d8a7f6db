//! Numeric extraction from delimited text files.
//!
//! Rows are split on a single delimiter character. Consecutive delimiters
//! collapse, so empty fields do not occupy a column position. Columns are
//! addressed 1-based.
//!
//! ```rust,no_run
//! use ndtable::csv::{CsvFile, CsvOptions, ParseMode};
//!
//! let mut file = CsvFile::open_with(
//!     "table.csv",
//!     CsvOptions::new().row_start(1).parse_mode(ParseMode::Strict),
//! )?;
//! let (rows, cols) = file.dimensions()?;
//! let breakpoints = file.column(1)?;
//! let block = file.block([2, 2], rows - 1, cols - 1)?;
//! # Ok::<(), ndtable::TableError>(())
//! ```
use std::fs::File;
use std::io::{BufRead, BufReader, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use log::{debug, warn};

use crate::error::{Result, TableError};

/// Default number of fields considered on each row
pub const MAX_COLUMNS: usize = 100;

/// Default number of characters considered on each row
pub const MAX_LINE_LENGTH: usize = 4096;

/// Treatment of tokens that are not valid numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParseMode {
    /// Take the longest numeric prefix of the token, or `0.0` if there is none.
    /// Malformed tokens are counted and reported through `log::warn!`.
    #[default]
    Permissive,
    /// Fail with [`TableError::Parse`] on the first malformed token.
    Strict,
}

/// Reader configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct CsvOptions {
    delimiter: char,
    row_start: usize,
    col_start: usize,
    max_columns: usize,
    max_line_length: usize,
    parse: ParseMode,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            delimiter: ',',
            row_start: 0,
            col_start: 0,
            max_columns: MAX_COLUMNS,
            max_line_length: MAX_LINE_LENGTH,
            parse: ParseMode::Permissive,
        }
    }
}

impl CsvOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Field separator; `,` by default.
    pub fn delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Number of leading rows to skip when extracting columns, e.g. a header.
    pub fn row_start(mut self, rows: usize) -> Self {
        self.row_start = rows;
        self
    }

    /// Offset added to every requested column index.
    pub fn col_start(mut self, cols: usize) -> Self {
        self.col_start = cols;
        self
    }

    /// Fields past this count on a row are ignored.
    pub fn max_columns(mut self, n: usize) -> Self {
        self.max_columns = n;
        self
    }

    /// Characters past this count on a row are ignored.
    pub fn max_line_length(mut self, n: usize) -> Self {
        self.max_line_length = n;
        self
    }

    pub fn parse_mode(mut self, mode: ParseMode) -> Self {
        self.parse = mode;
        self
    }
}

/// An open delimited text file.
///
/// The file stays open for the lifetime of the handle and is released when
/// the handle is dropped or [closed](CsvFile::close). Each extraction rereads
/// the file from the start. Row and column counts are computed at most once
/// per handle.
#[derive(Debug)]
pub struct CsvFile {
    path: PathBuf,
    file: File,
    options: CsvOptions,

    /// (rows, columns), filled on first request
    dimensions: Option<(usize, usize)>,
}

impl CsvFile {
    /// Open with default options.
    ///
    /// # Errors
    /// * `Io` if the file cannot be opened
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with(path, CsvOptions::default())
    }

    /// Open with the given options.
    ///
    /// # Errors
    /// * `Io` if the file cannot be opened
    pub fn open_with(path: impl AsRef<Path>, options: CsvOptions) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path).map_err(|source| TableError::Io {
            path: path.clone(),
            source,
        })?;
        debug!("opened {}", path.display());

        Ok(Self {
            path,
            file,
            options,
            dimensions: None,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn options(&self) -> &CsvOptions {
        &self.options
    }

    /// Extract the values of one 1-based column, one entry per row that has it,
    /// in file order.
    ///
    /// Column 0, a column no row reaches, and an empty file all give an empty vector.
    ///
    /// # Errors
    /// * `Io` if the file cannot be read
    /// * `Parse` on a malformed token in strict mode
    pub fn column(&mut self, column: usize) -> Result<Vec<f64>> {
        if column == 0 {
            warn!("column 0 requested from {}; columns are 1-based", self.path.display());
            return Ok(Vec::new());
        }

        let opts = self.options.clone();
        let target = opts.col_start + column - 1;
        let mut values = Vec::new();
        let mut coerced = 0_usize;

        self.scan(|row, line| {
            if row < opts.row_start {
                return Ok(());
            }
            if let Some(token) = tokens(line, &opts).nth(target) {
                let (v, exact) = convert(token, opts.parse, row, target)?;
                coerced += !exact as usize;
                values.push(v);
            }
            Ok(())
        })?;

        if coerced > 0 {
            warn!(
                "{coerced} malformed tokens in column {column} of {} were read as numeric prefixes or zero",
                self.path.display()
            );
        }
        debug!(
            "read {} values from column {column} of {}",
            values.len(),
            self.path.display()
        );

        Ok(values)
    }

    /// Number of rows (every line of the file) and of columns (fields on the first line).
    ///
    /// Computed on the first call and cached on this handle.
    ///
    /// # Errors
    /// * `Io` if the file cannot be read
    pub fn dimensions(&mut self) -> Result<(usize, usize)> {
        if let Some(dims) = self.dimensions {
            return Ok(dims);
        }

        let opts = self.options.clone();
        let (mut rows, mut cols) = (0, 0);
        self.scan(|row, line| {
            if row == 0 {
                cols = tokens(line, &opts).count();
            }
            rows += 1;
            Ok(())
        })?;

        self.dimensions = Some((rows, cols));
        Ok((rows, cols))
    }

    /// Read a `rows` x `cols` block in row-major order, starting at the 1-based
    /// `[row, column]` given by `field`. The row and column offsets in the
    /// options do not apply here. Cells missing from the file are `0.0`.
    ///
    /// # Errors
    /// * `Io` if the file cannot be read
    /// * `Parse` on a malformed token in strict mode
    pub fn block(&mut self, field: [usize; 2], rows: usize, cols: usize) -> Result<Vec<f64>> {
        let opts = self.options.clone();
        let row_start = field[0].saturating_sub(1);
        let col_start = field[1].saturating_sub(1);
        let mut out = vec![0.0; rows * cols];
        let mut coerced = 0_usize;

        self.scan(|row, line| {
            if row < row_start || row - row_start >= rows {
                return Ok(());
            }
            let i = row - row_start;
            for (j, token) in tokens(line, &opts)
                .enumerate()
                .skip(col_start)
                .take(cols)
            {
                let (v, exact) = convert(token, opts.parse, row, j)?;
                coerced += !exact as usize;
                out[i * cols + (j - col_start)] = v;
            }
            Ok(())
        })?;

        if coerced > 0 {
            warn!(
                "{coerced} malformed tokens in block at {field:?} of {} were read as numeric prefixes or zero",
                self.path.display()
            );
        }

        Ok(out)
    }

    /// Release the file.
    pub fn close(self) {
        debug!("closed {}", self.path.display());
    }

    /// Visit every line from the start of the file with its 0-based row index.
    /// Line terminators are stripped and over-long lines are truncated.
    fn scan<F>(&self, mut visit: F) -> Result<()>
    where
        F: FnMut(usize, &str) -> Result<()>,
    {
        let io_err = |source| TableError::Io {
            path: self.path.clone(),
            source,
        };

        let mut file = &self.file;
        file.seek(SeekFrom::Start(0)).map_err(io_err)?;
        let mut reader = BufReader::new(file);

        let max_len = self.options.max_line_length;
        let mut buf = Vec::new();
        let mut row = 0;
        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf).map_err(io_err)? == 0 {
                break;
            }
            let text = String::from_utf8_lossy(&buf);
            let mut line = text.trim_end_matches(['\n', '\r']);
            if line.len() > max_len {
                warn!(
                    "row {} of {} exceeds {max_len} characters; the remainder is ignored",
                    row + 1,
                    self.path.display()
                );
                let mut end = max_len;
                while !line.is_char_boundary(end) {
                    end -= 1;
                }
                line = &line[..end];
            }
            visit(row, line)?;
            row += 1;
        }

        Ok(())
    }
}

/// Open a file, extract one 1-based column, and close it again.
///
/// # Errors
/// * `Io` if the file cannot be opened or read
pub fn read_column(path: impl AsRef<Path>, column: usize) -> Result<Vec<f64>> {
    let mut file = CsvFile::open(path)?;
    let values = file.column(column)?;
    file.close();
    Ok(values)
}

/// Non-empty fields of a line, up to the column limit
#[inline]
fn tokens<'a>(line: &'a str, opts: &CsvOptions) -> impl Iterator<Item = &'a str> {
    line.split(opts.delimiter)
        .filter(|t| !t.is_empty())
        .take(opts.max_columns)
}

/// Convert one token, returning the value and whether the whole token was numeric.
fn convert(token: &str, mode: ParseMode, row: usize, column: usize) -> Result<(f64, bool)> {
    if let Ok(v) = token.trim().parse::<f64>() {
        return Ok((v, true));
    }
    match mode {
        ParseMode::Permissive => Ok((numeric_prefix(token).unwrap_or(0.0), false)),
        ParseMode::Strict => Err(TableError::Parse {
            row: row + 1,
            column: column + 1,
            token: token.to_string(),
        }),
    }
}

/// Longest leading decimal number in the token, after leading whitespace,
/// like `atof` reads it.
fn numeric_prefix(token: &str) -> Option<f64> {
    let s = token.trim_start();
    let b = s.as_bytes();
    let digits_from = |mut i: usize| {
        while i < b.len() && b[i].is_ascii_digit() {
            i += 1;
        }
        i
    };

    let mut end = 0;
    if end < b.len() && (b[end] == b'+' || b[end] == b'-') {
        end += 1;
    }
    let int_end = digits_from(end);
    let mut ndigits = int_end - end;
    end = int_end;
    if end < b.len() && b[end] == b'.' {
        let frac_end = digits_from(end + 1);
        ndigits += frac_end - end - 1;
        end = frac_end;
    }
    if ndigits == 0 {
        return None;
    }

    // Exponent only counts if it has digits
    if end < b.len() && (b[end] == b'e' || b[end] == b'E') {
        let mut i = end + 1;
        if i < b.len() && (b[i] == b'+' || b[i] == b'-') {
            i += 1;
        }
        let exp_end = digits_from(i);
        if exp_end > i {
            end = exp_end;
        }
    }

    s[..end].parse().ok()
}

#[cfg(test)]
mod test {
    use super::{numeric_prefix, read_column, CsvFile, CsvOptions, ParseMode};
    use crate::error::TableError;
    use crate::testing::{init_logging, write_fixture};

    #[test]
    fn test_column_in_file_order() {
        init_logging();
        let path = write_fixture("column-order", "1.0,10.5\n2.0,20.5\n3.0,30.5\n");
        let values = read_column(&path, 2).unwrap();
        assert_eq!(values, vec![10.5, 20.5, 30.5]);
        assert_eq!(read_column(&path, 1).unwrap(), vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_missing_file() {
        let path = std::env::temp_dir().join("ndtable-does-not-exist.csv");
        assert!(matches!(read_column(&path, 1), Err(TableError::Io { .. })));
    }

    #[test]
    fn test_empty_and_absent() {
        let empty = write_fixture("empty", "");
        assert!(read_column(&empty, 1).unwrap().is_empty());

        let path = write_fixture("absent", "1,2\n3,4\n");
        assert!(read_column(&path, 3).unwrap().is_empty());
        assert!(read_column(&path, 0).unwrap().is_empty());
    }

    /// Rows that are too short contribute nothing, and empty fields collapse
    #[test]
    fn test_ragged_rows() {
        let path = write_fixture("ragged", "1,2,3\n4\n\n5,,6\r\n");
        assert_eq!(read_column(&path, 1).unwrap(), vec![1.0, 4.0, 5.0]);
        assert_eq!(read_column(&path, 2).unwrap(), vec![2.0, 6.0]);
        assert_eq!(read_column(&path, 3).unwrap(), vec![3.0]);
    }

    #[test]
    fn test_permissive_coercion() {
        init_logging();
        let path = write_fixture("permissive", "x,y\n1.5abc, 2e3\n-.5e-1q,nan\n");
        let mut file = CsvFile::open(&path).unwrap();
        assert_eq!(file.column(1).unwrap(), vec![0.0, 1.5, -0.05]);
        let y = file.column(2).unwrap();
        assert_eq!(y[..2], [0.0, 2000.0]);
        assert!(y[2].is_nan());
    }

    #[test]
    fn test_strict_rejects() {
        let path = write_fixture("strict", "x,y\n1,2\n");
        let opts = CsvOptions::new().parse_mode(ParseMode::Strict);
        let mut file = CsvFile::open_with(&path, opts.clone()).unwrap();
        match file.column(2) {
            Err(TableError::Parse { row, column, token }) => {
                assert_eq!((row, column), (1, 2));
                assert_eq!(token, "y");
            }
            other => panic!("unexpected {other:?}"),
        }

        let mut file = CsvFile::open_with(&path, opts.row_start(1)).unwrap();
        assert_eq!(file.column(2).unwrap(), vec![2.0]);
    }

    #[test]
    fn test_offsets_and_delimiter() {
        let path = write_fixture("offsets", "a;b;c\n1;2;3\n4;5;6\n");
        let opts = CsvOptions::new().delimiter(';').row_start(1).col_start(1);
        let mut file = CsvFile::open_with(&path, opts).unwrap();
        assert_eq!(file.column(1).unwrap(), vec![2.0, 5.0]);
        assert_eq!(file.column(2).unwrap(), vec![3.0, 6.0]);
    }

    #[test]
    fn test_limits() {
        let path = write_fixture("limits", "1,2,3,4\n5,6,7,8\n");
        let opts = CsvOptions::new().max_columns(2);
        let mut file = CsvFile::open_with(&path, opts).unwrap();
        assert!(file.column(3).unwrap().is_empty());
        assert_eq!(file.dimensions().unwrap(), (2, 2));

        let opts = CsvOptions::new().max_line_length(3);
        let mut file = CsvFile::open_with(&path, opts).unwrap();
        assert_eq!(file.column(2).unwrap(), vec![2.0, 6.0]);
        assert!(file.column(3).unwrap().is_empty());
    }

    /// Counts are computed once per handle and survive changes to the file
    #[test]
    fn test_dimensions_cached() {
        let path = write_fixture("dims", "1,2,3\n4,5,6\n");
        let mut file = CsvFile::open(&path).unwrap();
        assert_eq!(file.dimensions().unwrap(), (2, 3));

        std::fs::write(&path, "1\n2\n3\n4\n").unwrap();
        assert_eq!(file.dimensions().unwrap(), (2, 3));
        file.close();

        let mut file = CsvFile::open(&path).unwrap();
        assert_eq!(file.dimensions().unwrap(), (4, 1));
    }

    #[test]
    fn test_block() {
        let path = write_fixture("block", "h,x,y\nr0,1,2\nr1,3,4\nr2,5,6\n");
        let mut file = CsvFile::open(&path).unwrap();
        assert_eq!(file.block([2, 2], 2, 2).unwrap(), vec![1.0, 2.0, 3.0, 4.0]);

        // Past the end of the file the block is zero-filled
        assert_eq!(
            file.block([4, 2], 2, 3).unwrap(),
            vec![5.0, 6.0, 0.0, 0.0, 0.0, 0.0]
        );
    }

    #[test]
    fn test_numeric_prefix() {
        assert_eq!(numeric_prefix("  12.5kg"), Some(12.5));
        assert_eq!(numeric_prefix("+3e2x"), Some(300.0));
        assert_eq!(numeric_prefix("4e"), Some(4.0));
        assert_eq!(numeric_prefix(".25."), Some(0.25));
        assert_eq!(numeric_prefix("-"), None);
        assert_eq!(numeric_prefix("."), None);
        assert_eq!(numeric_prefix("abc"), None);
    }
}
