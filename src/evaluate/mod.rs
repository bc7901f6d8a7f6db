//! Interpolated evaluation of a table.
//!
//! Evaluation proceeds one axis at a time, starting from axis 0: the value at a
//! query point is an interpolation along axis 0 of values that are themselves
//! interpolations along axis 1, and so on down to the stored data. Only the
//! breakpoints a method actually needs are visited on each axis.
//!
//! ```rust
//! use ndtable::{build_from_raw_arrays, ExtrapMethod, InterpMethod};
//!
//! let x = [0.0, 1.0];
//! let y = [0.0, 10.0, 20.0];
//! let z = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0]; // z(x0, y0), z(x0, y1), ...
//! let table = build_from_raw_arrays(&[&x[..], &y[..]], &z).unwrap();
//!
//! let v = table
//!     .evaluate(&[0.5, 5.0], InterpMethod::Linear, ExtrapMethod::Hold)
//!     .unwrap();
//! assert_eq!(v, 3.0);
//!
//! // Slope along y
//! let dv = table
//!     .evaluate_derivative(&[0.5, 5.0], &[0.0, 1.0], InterpMethod::Linear, ExtrapMethod::Hold)
//!     .unwrap();
//! assert!((dv - 0.1).abs() < 1e-12);
//! ```
//!
//! Operation Complexity, per axis
//! * O(1) for `Hold` and `Nearest`
//! * O(2) for `Linear`
//! * up to O(6) for the cubic methods
//!
//! multiplied across axes, plus a bisection search on each axis.
mod dual;
pub(crate) mod one_dim;

use dual::Dual;

use crate::error::{EvaluationError, Result};
use crate::table::NdTable;
use crate::MAX_RANK;

/// Interpolation inside the breakpoint range of each axis.
///
/// Discriminants match the integer codes used by external callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum InterpMethod {
    /// Value of the previous breakpoint
    Hold = 1,
    /// Value of the closest breakpoint; ties go to the previous one
    Nearest = 2,
    Linear = 3,
    /// Cubic Hermite with Akima slopes
    Akima = 4,
    /// Monotone cubic Hermite with Fritsch-Butland slopes
    FritschButland = 5,
    /// Monotone cubic Hermite with Steffen slopes
    Steffen = 6,
}

/// Extrapolation outside the breakpoint range of each axis.
///
/// Discriminants match the integer codes used by external callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum ExtrapMethod {
    /// Value at the nearest end of the axis
    Hold = 1,
    /// Continue from the nearest end with the interpolant's slope there
    Linear = 2,
    /// Fail with [`EvaluationError::OutOfRange`]
    Reject = 3,
}

impl TryFrom<i32> for InterpMethod {
    type Error = EvaluationError;

    fn try_from(code: i32) -> std::result::Result<Self, Self::Error> {
        match code {
            1 => Ok(Self::Hold),
            2 => Ok(Self::Nearest),
            3 => Ok(Self::Linear),
            4 => Ok(Self::Akima),
            5 => Ok(Self::FritschButland),
            6 => Ok(Self::Steffen),
            _ => Err(EvaluationError::UnknownMethod {
                kind: "interpolation",
                code,
            }),
        }
    }
}

impl TryFrom<i32> for ExtrapMethod {
    type Error = EvaluationError;

    fn try_from(code: i32) -> std::result::Result<Self, Self::Error> {
        match code {
            1 => Ok(Self::Hold),
            2 => Ok(Self::Linear),
            3 => Ok(Self::Reject),
            _ => Err(EvaluationError::UnknownMethod {
                kind: "extrapolation",
                code,
            }),
        }
    }
}

impl NdTable {
    /// Evaluate the table at a point with one coordinate per axis.
    ///
    /// # Errors
    ///   * If the dimensionality of the point does not match the table
    ///   * If a coordinate is NaN
    ///   * If a coordinate is outside its axis under `ExtrapMethod::Reject`
    ///   * If a cell used by the evaluation has breakpoints out of order
    pub fn evaluate(
        &self,
        point: &[f64],
        interp: InterpMethod,
        extrap: ExtrapMethod,
    ) -> Result<f64> {
        let ndims = self.check_len(point.len())?;
        let x = &mut [Dual::ZERO; MAX_RANK][..ndims];
        (0..ndims).for_each(|i| x[i] = Dual::constant(point[i]));

        Ok(self.populate(0, 0, x, interp, extrap)?.v)
    }

    /// Directional derivative of the interpolant at `point` along `delta`.
    ///
    /// Along axes evaluated with `Hold` or `Nearest`, or extrapolated with
    /// `ExtrapMethod::Hold`, the interpolant is flat and contributes nothing.
    ///
    /// # Errors
    ///   * Same as [`NdTable::evaluate`]
    ///   * If `delta` does not have one entry per axis
    pub fn evaluate_derivative(
        &self,
        point: &[f64],
        delta: &[f64],
        interp: InterpMethod,
        extrap: ExtrapMethod,
    ) -> Result<f64> {
        let ndims = self.check_len(point.len())?;
        self.check_len(delta.len())?;
        let x = &mut [Dual::ZERO; MAX_RANK][..ndims];
        (0..ndims).for_each(|i| x[i] = Dual::new(point[i], delta[i]));

        Ok(self.populate(0, 0, x, interp, extrap)?.d)
    }

    /// Evaluate on a contiguous list of observation points given as one
    /// coordinate slice per axis.
    ///
    /// # Errors
    ///   * If the number of coordinate slices does not match the table
    ///   * If any coordinate slice differs in length from `out`
    ///   * Any error from [`NdTable::evaluate`], for the first failing point
    pub fn evaluate_many(
        &self,
        obs: &[&[f64]],
        interp: InterpMethod,
        extrap: ExtrapMethod,
        out: &mut [f64],
    ) -> Result<()> {
        let ndims = self.check_len(obs.len())?;
        if let Some(bad) = obs.iter().find(|x| x.len() != out.len()) {
            return Err(EvaluationError::DimensionMismatch {
                expected: out.len(),
                found: bad.len(),
            }
            .into());
        }

        let tmp = &mut [0.0; MAX_RANK][..ndims];
        for i in 0..out.len() {
            (0..ndims).for_each(|j| tmp[j] = obs[j][i]);
            out[i] = self.evaluate(tmp, interp, extrap)?;
        }

        Ok(())
    }

    #[inline]
    fn check_len(&self, n: usize) -> std::result::Result<usize, EvaluationError> {
        match n == self.rank() {
            true => Ok(n),
            false => Err(EvaluationError::DimensionMismatch {
                expected: self.rank(),
                found: n,
            }),
        }
    }

    /// Recursive evaluation of the interpolant on each dimension,
    /// where `offset` is the start of the data block below axis `dim`.
    fn populate(
        &self,
        dim: usize,
        offset: usize,
        x: &[Dual],
        interp: InterpMethod,
        extrap: ExtrapMethod,
    ) -> std::result::Result<Dual, EvaluationError> {
        // At leaves, index values
        if dim == self.rank() {
            return Ok(Dual::constant(self.data[offset]));
        }

        // Otherwise, each breakpoint on this axis is an evaluation of the next one
        let stride = self.strides[dim];
        let mut node = |k: usize| -> std::result::Result<Dual, EvaluationError> {
            self.populate(dim + 1, offset + k * stride, x, interp, extrap)
        };

        one_dim::eval_axis(dim, &self.axes[dim], x[dim], interp, extrap, &mut node)
    }
}
