//! GCD fraction reduction for customary display

use std::fmt;

use crate::types::ratio::gcd;

/// Denominators shown as fractions by default. Everything else falls back
/// to a decimal rendering.
pub const COMMON_DENOMINATORS: [u64; 14] = [1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 12, 16, 32, 64];

/// A reduced mixed number, `whole numerator/denominator`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fraction {
    pub negative: bool,
    pub whole: u64,
    pub numerator: u64,
    /// `1` when there is no fractional part
    pub denominator: u64,
}

impl Fraction {
    /// Reduce `amount / per_unit` exactly. `per_unit` must be positive.
    pub fn reduce(amount: i64, per_unit: i64) -> Fraction {
        let num = amount.unsigned_abs();
        let den = per_unit.unsigned_abs().max(1);
        let g = gcd(num.into(), den.into()) as u64;
        let (num, den) = (num / g, den / g);
        let numerator = num % den;
        Fraction {
            negative: amount < 0,
            whole: num / den,
            numerator,
            denominator: if numerator == 0 { 1 } else { den },
        }
    }

    pub fn is_whole(&self) -> bool {
        self.numerator == 0
    }

    pub fn is_common(&self) -> bool {
        COMMON_DENOMINATORS.contains(&self.denominator)
    }

    /// Render with `join` between the whole part and the fraction
    pub fn render(&self, join: &str) -> String {
        let sign = if self.negative { "-" } else { "" };
        match (self.whole, self.numerator) {
            (whole, 0) => format!("{sign}{whole}"),
            (0, n) => format!("{sign}{n}/{}", self.denominator),
            (whole, n) => format!("{sign}{whole}{join}{n}/{}", self.denominator),
        }
    }
}

impl fmt::Display for Fraction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render("-"))
    }
}
