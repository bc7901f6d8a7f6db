//! The decoded, owned table.
use log::debug;

/// An N-dimensional lookup table on a rectilinear grid.
///
/// Assumes C-style ordering of data (z(x0, y0), z(x0, y1), ..., z(x0, yn), z(x1, y0), ...).
/// Assumes breakpoints are monotonically _increasing_. This is not checked on
/// construction; evaluation rejects any cell it uses that has a non-positive width.
///
/// Tables are only produced by [`crate::codec::decode`] (directly or through the
/// builders), which guarantees the shape invariants:
/// * `1 <= rank <= MAX_RANK`
/// * every dimension has at least one breakpoint
/// * `data.len()` is exactly the product of the dimensions
///
/// A table is never mutated after construction, so it can be shared freely
/// between evaluators.
#[derive(Debug, Clone, PartialEq)]
pub struct NdTable {
    /// Size of each dimension
    pub(crate) dims: Vec<usize>,

    /// x, y, ... breakpoints, each entry of size dims[i]
    pub(crate) axes: Vec<Vec<f64>>,

    /// Cumulative product of higher dimensions, used for indexing
    pub(crate) strides: Vec<usize>,

    /// Values at each grid point, size prod(dims)
    pub(crate) data: Vec<f64>,
}

impl NdTable {
    /// Assemble a table from parts that have already been validated.
    pub(crate) fn from_parts(axes: Vec<Vec<f64>>, data: Vec<f64>) -> Self {
        let dims: Vec<usize> = axes.iter().map(|a| a.len()).collect();
        let ndims = dims.len();

        // Each entry is the cumulative product of the size of dimensions
        // higher than this one, which is the stride between blocks
        // relating to a given index along each dimension.
        let mut strides = vec![1_usize; ndims];
        let mut acc = 1;
        for i in 0..ndims {
            strides[ndims - i - 1] = acc;
            acc *= dims[ndims - i - 1];
        }

        Self {
            dims,
            axes,
            strides,
            data,
        }
    }

    /// Number of dimensions
    pub fn rank(&self) -> usize {
        self.dims.len()
    }

    /// Number of breakpoints on each axis
    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    /// Breakpoints of every axis, in axis order
    pub fn axes(&self) -> &[Vec<f64>] {
        &self.axes
    }

    /// Breakpoints of one axis
    pub fn axis(&self, i: usize) -> Option<&[f64]> {
        self.axes.get(i).map(|a| &a[..])
    }

    /// Row-major data block
    pub fn data(&self) -> &[f64] {
        &self.data
    }

    /// Stored value at a grid index, one entry per axis.
    pub fn value_at(&self, index: &[usize]) -> Option<f64> {
        if index.len() != self.rank() || index.iter().zip(&self.dims).any(|(&i, &n)| i >= n) {
            return None;
        }
        let offset: usize = index.iter().zip(&self.strides).map(|(i, s)| i * s).sum();
        self.data.get(offset).copied()
    }

    /// Serialize back to the flat buffer layout.
    pub fn to_flat_buffer(&self) -> Vec<f64> {
        crate::codec::encode(self)
    }

    /// Release the table. Consuming the handle makes any later use a compile error.
    pub fn close(self) {
        debug!("closing table with dims {:?}", self.dims);
    }
}
