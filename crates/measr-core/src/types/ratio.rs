//! Exact rational numbers
//!
//! Every conversion and comparison in the engine goes through [`Ratio`], so
//! nothing is approximated until a value has to be stored back into an
//! `i64` amount.

use std::cmp::Ordering;
use std::fmt;

use rust_decimal::Decimal;
use serde::{Serialize, Serializer};

use crate::error::{MeasureError, Result};

/// How a value that does not fit the target resolution is brought onto it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rounding {
    /// Drop the remainder (scalar division, like the money type)
    TowardZero,
    /// Round to nearest, ties away from zero (cross-system conversion)
    HalfAwayFromZero,
}

/// Greatest common divisor (Euclid)
pub fn gcd(mut a: u128, mut b: u128) -> u128 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

/// `10^exp` as `i128`, or `None` past the type's range
pub(crate) fn pow10(exp: u32) -> Option<i128> {
    10i128.checked_pow(exp)
}

/// A reduced fraction with a positive denominator.
///
/// Also the dimensionless result of dividing one quantity by another of the
/// same family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ratio {
    num: i128,
    den: i128,
}

impl Ratio {
    pub const ZERO: Ratio = Ratio { num: 0, den: 1 };
    pub const ONE: Ratio = Ratio { num: 1, den: 1 };

    /// Build a ratio, reducing it. A zero denominator is a division by zero.
    pub fn new(num: i128, den: i128) -> Result<Self> {
        if den == 0 {
            return Err(MeasureError::DivisionByZero);
        }
        let g = gcd(num.unsigned_abs(), den.unsigned_abs());
        // g divides both, so it fits in i128 unless both are i128::MIN
        let g = i128::try_from(g).map_err(|_| MeasureError::Overflow("ratio"))?;
        let (mut num, mut den) = (num / g, den / g);
        if den < 0 {
            num = num.checked_neg().ok_or(MeasureError::Overflow("ratio"))?;
            den = den.checked_neg().ok_or(MeasureError::Overflow("ratio"))?;
        }
        Ok(Self { num, den })
    }

    pub fn from_integer(n: i128) -> Self {
        Self { num: n, den: 1 }
    }

    /// Exact value of a decimal
    pub fn from_decimal(d: Decimal) -> Result<Self> {
        let den = pow10(d.scale()).ok_or(MeasureError::Overflow("decimal scale"))?;
        Self::new(d.mantissa(), den)
    }

    pub fn numer(&self) -> i128 {
        self.num
    }

    pub fn denom(&self) -> i128 {
        self.den
    }

    pub fn is_zero(&self) -> bool {
        self.num == 0
    }

    pub fn is_integer(&self) -> bool {
        self.den == 1
    }

    pub fn is_negative(&self) -> bool {
        self.num < 0
    }

    pub fn checked_neg(self) -> Result<Self> {
        let num = self.num.checked_neg().ok_or(MeasureError::Overflow("negation"))?;
        Ok(Self { num, den: self.den })
    }

    pub fn abs(self) -> Result<Self> {
        if self.num < 0 {
            self.checked_neg()
        } else {
            Ok(self)
        }
    }

    pub fn checked_add(self, rhs: Self) -> Result<Self> {
        let g = gcd(self.den.unsigned_abs(), rhs.den.unsigned_abs()) as i128;
        let (ld, rd) = (self.den / g, rhs.den / g);
        let num = self
            .num
            .checked_mul(rd)
            .zip(rhs.num.checked_mul(ld))
            .and_then(|(a, b)| a.checked_add(b))
            .ok_or(MeasureError::Overflow("addition"))?;
        let den = self
            .den
            .checked_mul(rd)
            .ok_or(MeasureError::Overflow("addition"))?;
        Self::new(num, den)
    }

    pub fn checked_sub(self, rhs: Self) -> Result<Self> {
        self.checked_add(rhs.checked_neg()?)
    }

    /// Multiply, cross-reducing first to keep intermediates small
    pub fn checked_mul(self, rhs: Self) -> Result<Self> {
        let g1 = gcd(self.num.unsigned_abs(), rhs.den.unsigned_abs()).max(1) as i128;
        let g2 = gcd(rhs.num.unsigned_abs(), self.den.unsigned_abs()).max(1) as i128;
        let num = (self.num / g1)
            .checked_mul(rhs.num / g2)
            .ok_or(MeasureError::Overflow("multiplication"))?;
        let den = (self.den / g2)
            .checked_mul(rhs.den / g1)
            .ok_or(MeasureError::Overflow("multiplication"))?;
        Self::new(num, den)
    }

    pub fn checked_div(self, rhs: Self) -> Result<Self> {
        if rhs.is_zero() {
            return Err(MeasureError::DivisionByZero);
        }
        self.checked_mul(Self {
            num: rhs.den,
            den: rhs.num,
        })
    }

    /// Bring the value onto an integer
    pub fn round(&self, mode: Rounding) -> i128 {
        let q = self.num / self.den;
        let r = self.num % self.den;
        match mode {
            Rounding::TowardZero => q,
            Rounding::HalfAwayFromZero => {
                // |r| < den, so doubling cannot overflow for any den we build
                if r.unsigned_abs() * 2 >= self.den.unsigned_abs() {
                    q + self.num.signum()
                } else {
                    q
                }
            }
        }
    }

    /// Smallest number of decimal places that represents the value exactly,
    /// or `None` if it is not a finite decimal.
    pub fn exact_scale(&self) -> Option<u32> {
        let mut den = self.den;
        let (mut twos, mut fives) = (0u32, 0u32);
        while den % 2 == 0 {
            den /= 2;
            twos += 1;
        }
        while den % 5 == 0 {
            den /= 5;
            fives += 1;
        }
        (den == 1).then_some(twos.max(fives))
    }

    /// Express the value as `mantissa / 10^scale`.
    ///
    /// Uses the smallest exact scale up to `max_scale`; otherwise rounds at
    /// `max_scale`. The flag reports whether the result is exact.
    pub fn to_scaled(&self, max_scale: u32, mode: Rounding) -> Result<(i128, u32, bool)> {
        if let Some(scale) = self.exact_scale().filter(|s| *s <= max_scale) {
            let factor = pow10(scale).ok_or(MeasureError::Overflow("scale"))?;
            // den divides 10^scale by construction
            let mantissa = self
                .num
                .checked_mul(factor / self.den)
                .ok_or(MeasureError::Overflow("scale"))?;
            return Ok((mantissa, scale, true));
        }
        let mantissa = self.scaled_at(max_scale, mode)?;
        Ok((mantissa, max_scale, false))
    }

    /// Mantissa at exactly `scale` decimal places
    pub fn scaled_at(&self, scale: u32, mode: Rounding) -> Result<i128> {
        let factor = pow10(scale).ok_or(MeasureError::Overflow("scale"))?;
        let scaled = self.checked_mul(Self::from_integer(factor))?;
        Ok(scaled.round(mode))
    }

    /// Convert to a `Decimal`, rounding half away from zero past 28 places
    pub fn to_decimal(&self) -> Result<Decimal> {
        let (mantissa, scale, _) = self.to_scaled(28, Rounding::HalfAwayFromZero)?;
        Decimal::try_from_i128_with_scale(mantissa, scale)
            .map_err(|_| MeasureError::Overflow("decimal conversion"))
    }

    pub fn to_f64(&self) -> f64 {
        self.num as f64 / self.den as f64
    }
}

impl Ord for Ratio {
    // Continued-fraction comparison: never multiplies, so it cannot overflow
    fn cmp(&self, other: &Self) -> Ordering {
        let (a_int, a_rem) = (self.num.div_euclid(self.den), self.num.rem_euclid(self.den));
        let (b_int, b_rem) = (other.num.div_euclid(other.den), other.num.rem_euclid(other.den));
        if a_int != b_int {
            return a_int.cmp(&b_int);
        }
        match (a_rem == 0, b_rem == 0) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
            // a_rem/a_den < b_rem/b_den  <=>  b_den/b_rem < a_den/a_rem
            (false, false) => Ratio {
                num: other.den,
                den: b_rem,
            }
            .cmp(&Ratio {
                num: self.den,
                den: a_rem,
            }),
        }
    }
}

impl PartialOrd for Ratio {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Ratio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let places = f.precision().map_or(6, |p| p as u32);
        let trim = f.precision().is_none();
        write!(f, "{}", crate::format::decimal_string(self, places, trim))
    }
}

impl Serialize for Ratio {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.to_f64())
    }
}
