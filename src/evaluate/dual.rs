//! Forward-mode dual numbers.
//!
//! Every quantity in the kernel carries its value and its derivative along
//! the requested direction, so the directional derivative of the interpolant
//! falls out of the same arithmetic that produces the value.
use std::ops::{Add, Div, Mul, Neg, Sub};

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Dual {
    /// Value
    pub v: f64,
    /// Directional derivative
    pub d: f64,
}

impl Dual {
    pub const ZERO: Self = Self { v: 0.0, d: 0.0 };
    pub const ONE: Self = Self { v: 1.0, d: 0.0 };

    #[inline]
    pub fn new(v: f64, d: f64) -> Self {
        Self { v, d }
    }

    #[inline]
    pub fn constant(v: f64) -> Self {
        Self { v, d: 0.0 }
    }

    #[inline]
    pub fn abs(self) -> Self {
        if self.v < 0.0 {
            -self
        } else {
            self
        }
    }

    /// Lesser of the two by value
    #[inline]
    pub fn min(self, other: Self) -> Self {
        if other.v < self.v {
            other
        } else {
            self
        }
    }
}

impl Add for Dual {
    type Output = Self;
    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self::new(self.v + rhs.v, self.d + rhs.d)
    }
}

impl Sub for Dual {
    type Output = Self;
    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.v - rhs.v, self.d - rhs.d)
    }
}

impl Mul for Dual {
    type Output = Self;
    #[inline]
    fn mul(self, rhs: Self) -> Self {
        Self::new(self.v * rhs.v, self.d * rhs.v + self.v * rhs.d)
    }
}

impl Div for Dual {
    type Output = Self;
    #[inline]
    fn div(self, rhs: Self) -> Self {
        Self::new(
            self.v / rhs.v,
            (self.d * rhs.v - self.v * rhs.d) / (rhs.v * rhs.v),
        )
    }
}

impl Neg for Dual {
    type Output = Self;
    #[inline]
    fn neg(self) -> Self {
        Self::new(-self.v, -self.d)
    }
}

impl Add<f64> for Dual {
    type Output = Self;
    #[inline]
    fn add(self, rhs: f64) -> Self {
        Self::new(self.v + rhs, self.d)
    }
}

impl Sub<f64> for Dual {
    type Output = Self;
    #[inline]
    fn sub(self, rhs: f64) -> Self {
        Self::new(self.v - rhs, self.d)
    }
}

impl Mul<f64> for Dual {
    type Output = Self;
    #[inline]
    fn mul(self, rhs: f64) -> Self {
        Self::new(self.v * rhs, self.d * rhs)
    }
}
