//! Interpolation and extrapolation along a single axis.
//!
//! The values at the breakpoints of this axis are not known up front: each one
//! is the result of evaluating the remaining axes, so they are requested from
//! the caller through `node` and only the ones the method needs are computed.
//!
//! References
//! * H. Akima, "A new method of interpolation and smooth curve fitting based
//!   on local procedures", J. ACM 17(4), 1970.
//! * F. N. Fritsch and J. Butland, "A method for constructing local monotone
//!   piecewise cubic interpolants", SIAM J. Sci. Stat. Comput. 5(2), 1984.
//! * M. Steffen, "A simple method for monotonic interpolation in one
//!   dimension", Astron. Astrophys. 239, 1990.
use super::dual::Dual;
use super::{ExtrapMethod, InterpMethod};
use crate::error::EvaluationError;

/// Callback producing the (dual) value at a breakpoint index of this axis
pub(crate) type Node<'f> = dyn FnMut(usize) -> Result<Dual, EvaluationError> + 'f;

/// Which side of the breakpoint range a coordinate falls on
#[derive(Clone, Copy, PartialEq)]
enum Side {
    Inside,
    Low,
    High,
}

/// Evaluate along axis number `dim` with breakpoints `grid` at coordinate `x`.
pub(crate) fn eval_axis(
    dim: usize,
    grid: &[f64],
    x: Dual,
    interp: InterpMethod,
    extrap: ExtrapMethod,
    node: &mut Node<'_>,
) -> Result<Dual, EvaluationError> {
    let n = grid.len();
    if x.v.is_nan() {
        return Err(EvaluationError::NotFinite { axis: dim });
    }

    let (lo, hi) = (grid[0], grid[n - 1]);
    let side = match x.v {
        v if v < lo => Side::Low,
        v if v > hi => Side::High,
        _ => Side::Inside,
    };
    if side != Side::Inside && extrap == ExtrapMethod::Reject {
        return Err(EvaluationError::OutOfRange {
            axis: dim,
            value: x.v,
            min: lo,
            max: hi,
        });
    }

    // A single breakpoint makes the table constant along this axis
    if n == 1 {
        return node(0);
    }

    match (side, extrap) {
        (Side::Inside, _) => interp_cell(dim, grid, x, interp, node),
        (Side::Low, ExtrapMethod::Hold) => node(0),
        (Side::High, ExtrapMethod::Hold) => node(n - 1),
        (Side::Low, _) => {
            let k = end_slope(dim, grid, interp, Side::Low, node)?;
            Ok(node(0)? + k * (x - lo))
        }
        (Side::High, _) => {
            let k = end_slope(dim, grid, interp, Side::High, node)?;
            Ok(node(n - 1)? + k * (x - hi))
        }
    }
}

/// Get the lower-corner index of the cell containing `v`, saturating to the
/// first and last cells at the edges.
#[inline]
fn get_loc(grid: &[f64], v: f64) -> usize {
    let iloc = grid.partition_point(|x| *x < v) as isize - 1;
    (iloc.max(0) as usize).min(grid.len() - 2)
}

/// Width of cell `i`, which must be positive
#[inline]
fn cell_width(dim: usize, grid: &[f64], i: usize) -> Result<f64, EvaluationError> {
    let h = grid[i + 1] - grid[i];
    if h > 0.0 {
        Ok(h)
    } else {
        Err(EvaluationError::NonMonotonic {
            axis: dim,
            index: i + 1,
        })
    }
}

/// Interpolate inside the breakpoint range
fn interp_cell(
    dim: usize,
    grid: &[f64],
    x: Dual,
    interp: InterpMethod,
    node: &mut Node<'_>,
) -> Result<Dual, EvaluationError> {
    let i = get_loc(grid, x.v);
    let h = cell_width(dim, grid, i)?;

    // Normalized coordinate in the cell
    let t = Dual::new((x.v - grid[i]) / h, x.d / h);

    match interp {
        InterpMethod::Hold => match t.v < 1.0 {
            true => node(i),
            false => node(i + 1),
        },
        // Ties go to the lower breakpoint
        InterpMethod::Nearest => match t.v > 0.5 {
            true => node(i + 1),
            false => node(i),
        },
        InterpMethod::Linear => {
            let (y0, y1) = (node(i)?, node(i + 1)?);
            // This form is exact at both ends of the cell
            Ok((Dual::ONE - t) * y0 + t * y1)
        }
        InterpMethod::Akima | InterpMethod::FritschButland | InterpMethod::Steffen => {
            let w = Window::fetch(dim, grid, i, node)?;
            let k0 = w.slope(interp, i) * h;
            let k1 = w.slope(interp, i + 1) * h;
            Ok(normalized_hermite_spline(t, w.y(i), w.y(i + 1), k0, k1))
        }
    }
}

/// Slope of the interpolant at the first or last breakpoint, used for linear extrapolation.
///
/// Piecewise-constant and linear methods continue with the secant of the end cell;
/// the cubic methods continue with their end-node slope.
fn end_slope(
    dim: usize,
    grid: &[f64],
    interp: InterpMethod,
    side: Side,
    node: &mut Node<'_>,
) -> Result<Dual, EvaluationError> {
    let n = grid.len();
    let (i, k) = match side {
        Side::High => (n - 2, n - 1),
        _ => (0, 0),
    };

    match interp {
        InterpMethod::Hold | InterpMethod::Nearest | InterpMethod::Linear => {
            let h = cell_width(dim, grid, i)?;
            Ok((node(i + 1)? - node(i)?) * (1.0 / h))
        }
        _ => Ok(Window::fetch(dim, grid, i, node)?.slope(interp, k)),
    }
}

/// Evaluate a cubic Hermite polynomial on the unit interval with values `y0`, `y1`
/// and slopes `k0`, `k1` in normalized units at the ends.
///
/// Written in the basis-function form so that `t = 0` and `t = 1` return
/// `y0` and `y1` exactly.
#[inline]
fn normalized_hermite_spline(t: Dual, y0: Dual, y1: Dual, k0: Dual, k1: Dual) -> Dual {
    let t2 = t * t;
    let t3 = t2 * t;

    let h00 = t3 * 2.0 - t2 * 3.0 + 1.0;
    let h10 = t3 - t2 * 2.0 + t;
    let h01 = t2 * 3.0 - t3 * 2.0;
    let h11 = t3 - t2;

    h00 * y0 + h10 * k0 + h01 * y1 + h11 * k1
}

/// Sign of a value, with zero for zero
#[inline]
fn sign(v: f64) -> f64 {
    match v {
        v if v > 0.0 => 1.0,
        v if v < 0.0 => -1.0,
        _ => 0.0,
    }
}

/// Breakpoint values around one cell, enough to estimate the slopes at both
/// of its ends with any of the cubic methods.
struct Window<'a> {
    grid: &'a [f64],

    /// Index of the first fetched breakpoint
    lo: usize,

    /// Values at breakpoints lo, lo + 1, ...
    ys: [Dual; 6],
}

impl<'a> Window<'a> {
    /// Fetch breakpoints `i - 2 ..= i + 3` (clipped to the axis) for cell `i`
    fn fetch(
        dim: usize,
        grid: &'a [f64],
        i: usize,
        node: &mut Node<'_>,
    ) -> Result<Self, EvaluationError> {
        let lo = i.saturating_sub(2);
        let hi = (i + 3).min(grid.len() - 1);

        let mut ys = [Dual::ZERO; 6];
        for k in lo..=hi {
            if k < hi {
                cell_width(dim, grid, k)?;
            }
            ys[k - lo] = node(k)?;
        }

        Ok(Self { grid, lo, ys })
    }

    #[inline]
    fn y(&self, k: usize) -> Dual {
        self.ys[k - self.lo]
    }

    #[inline]
    fn h(&self, k: usize) -> f64 {
        self.grid[k + 1] - self.grid[k]
    }

    /// Secant slope of cell `k`. Past either end of the axis, the secants
    /// continue linearly from the last two real cells.
    fn secant(&self, k: isize) -> Dual {
        let last = self.grid.len() as isize - 2; // index of the last cell
        if k < 0 {
            let (m0, m1) = (self.secant(0), self.secant(1));
            m0 + (m0 - m1) * (-k) as f64
        } else if k > last {
            let (m0, m1) = (self.secant(last), self.secant(last - 1));
            m0 + (m0 - m1) * (k - last) as f64
        } else {
            let k = k as usize;
            (self.y(k + 1) - self.y(k)) * (1.0 / self.h(k))
        }
    }

    /// Estimated slope of the interpolant at breakpoint `k`
    fn slope(&self, interp: InterpMethod, k: usize) -> Dual {
        let n = self.grid.len();

        // With a single cell there is nothing to estimate
        if n == 2 {
            return self.secant(0);
        }

        let ks = k as isize;
        match interp {
            InterpMethod::Akima => {
                let (m1, m2, m3, m4) = (
                    self.secant(ks - 2),
                    self.secant(ks - 1),
                    self.secant(ks),
                    self.secant(ks + 1),
                );
                let w1 = (m4 - m3).abs();
                let w2 = (m2 - m1).abs();
                let wsum = w1 + w2;
                if wsum.v == 0.0 {
                    (m2 + m3) * 0.5
                } else {
                    (w1 * m2 + w2 * m3) / wsum
                }
            }
            _ if k == 0 => self.secant(0),
            _ if k == n - 1 => self.secant(ks - 1),
            InterpMethod::FritschButland => {
                let (a, b) = (self.secant(ks - 1), self.secant(ks));
                if a.v * b.v <= 0.0 {
                    return Dual::ZERO;
                }
                let (big, small) = match a.v.abs() >= b.v.abs() {
                    true => (a, b),
                    false => (b, a),
                };
                (a * b * 3.0) / (big + small * 2.0)
            }
            _ => {
                // Steffen
                let (a, b) = (self.secant(ks - 1), self.secant(ks));
                let (h0, h1) = (self.h(k - 1), self.h(k));
                let p = (a * h1 + b * h0) * (1.0 / (h0 + h1));
                let bound = a.abs().min(b.abs()).min(p.abs() * 0.5);
                bound * (sign(a.v) + sign(b.v))
            }
        }
    }
}
