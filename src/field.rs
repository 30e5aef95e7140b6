//! Arithmetic in GF(2^8)
//!
//! The field is built over the reduction polynomial
//! x^8 + x^4 + x^3 + x^2 + 1 (`0x11d`). Every byte of the master key is shared
//! independently as one field element, so a share value is a vector of field
//! elements of the same length as the key.
//!
//! Multiplication runs a fixed eight rounds with masks instead of branches, so
//! its timing does not depend on the operands.

use std::ops::{Add, Mul};

/// Low byte of the reduction polynomial `0x11d`
const REDUCTION: u8 = 0x1d;

/// An element of GF(256)
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Gf256(u8);

impl Gf256 {
    pub const ZERO: Self = Self(0);
    pub const ONE: Self = Self(1);

    #[inline]
    #[must_use]
    pub const fn new(value: u8) -> Self {
        Self(value)
    }

    #[inline]
    #[must_use]
    pub const fn value(self) -> u8 {
        self.0
    }

    /// Multiplicative inverse, `None` for zero
    ///
    /// Computed as `a^254` by square-and-multiply.
    #[must_use]
    pub fn inverse(self) -> Option<Self> {
        if self.0 == 0 {
            return None;
        }
        let mut result = Self::ONE;
        let mut base = self;
        let mut exponent: u8 = 254;
        while exponent != 0 {
            if exponent & 1 == 1 {
                result = result * base;
            }
            base = base * base;
            exponent >>= 1;
        }
        Some(result)
    }

    /// Evaluates `coefficients[0] + coefficients[1]·x + ...` at `x` (Horner)
    #[must_use]
    pub fn evaluate(coefficients: &[Self], x: Self) -> Self {
        coefficients
            .iter()
            .rev()
            .fold(Self::ZERO, |acc, &c| acc * x + c)
    }
}

impl Add for Gf256 {
    type Output = Self;

    #[inline]
    #[allow(clippy::suspicious_arithmetic_impl)]
    fn add(self, rhs: Self) -> Self {
        Self(self.0 ^ rhs.0)
    }
}

impl Mul for Gf256 {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        let mut a = self.0;
        let mut b = rhs.0;
        let mut product = 0u8;
        for _ in 0..8 {
            product ^= a & 0u8.wrapping_sub(b & 1);
            let carry = 0u8.wrapping_sub(a >> 7);
            a = (a << 1) ^ (REDUCTION & carry);
            b >>= 1;
        }
        Self(product)
    }
}

impl std::iter::Sum for Gf256 {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

// Field elements are secret-dependent; keep them out of logs.
impl std::fmt::Debug for Gf256 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Gf256(..)")
    }
}
