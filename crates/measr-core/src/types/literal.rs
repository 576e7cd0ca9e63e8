//! Tokenized quantity literals

use rust_decimal::Decimal;

use super::quantity::Quantity;
use super::ratio::{Ratio, Rounding};
use super::unit::Unit;
use crate::error::{MeasureError, Result};

/// An already-tokenized literal: `-92-5/8in` is
/// `{ negative: true, whole: 92, fraction: Some((5, 8)), suffix: "in" }`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Literal {
    pub negative: bool,
    pub whole: Decimal,
    pub fraction: Option<(u64, u64)>,
    pub suffix: String,
}

impl Literal {
    pub fn new(whole: Decimal, suffix: impl Into<String>) -> Self {
        Self {
            negative: false,
            whole,
            fraction: None,
            suffix: suffix.into(),
        }
    }

    pub fn with_fraction(mut self, numerator: u64, denominator: u64) -> Self {
        self.fraction = Some((numerator, denominator));
        self
    }

    pub fn negated(mut self) -> Self {
        self.negative = !self.negative;
        self
    }

    /// Exact signed value in the literal's unit
    pub fn value(&self) -> Result<Ratio> {
        let mut value = Ratio::from_decimal(self.whole)?;
        if let Some((num, den)) = self.fraction {
            if den == 0 {
                return Err(MeasureError::InvalidFractionSyntax(format!(
                    "zero denominator in {num}/{den}"
                )));
            }
            if !self.whole.fract().is_zero() {
                return Err(MeasureError::InvalidFractionSyntax(format!(
                    "whole part {} of a mixed number must be an integer",
                    self.whole
                )));
            }
            let fraction = Ratio::new(num.into(), den.into())?;
            value = if value.is_negative() {
                value.checked_sub(fraction)?
            } else {
                value.checked_add(fraction)?
            };
        }
        if self.negative {
            value = value.checked_neg()?;
        }
        Ok(value)
    }
}

impl Quantity {
    /// Build a quantity from a tokenized literal.
    ///
    /// Fractions are accepted for customary units only, and must land on the
    /// `1/HCN` storage grid. A customary decimal rounds to the nearest
    /// sub-unit; an SI value needing more than 18 places is an `Overflow`.
    pub fn from_literal(literal: &Literal) -> Result<Self> {
        let unit = Unit::lookup(&literal.suffix)?;
        if literal.fraction.is_some() && !unit.is_customary() {
            return Err(MeasureError::InvalidFractionSyntax(format!(
                "fractions are not accepted for {} units like `{}`; use a decimal",
                if unit.is_temperature() { "temperature" } else { "SI" },
                unit
            )));
        }
        let value = literal.value()?;
        let (quantity, exact) = Self::from_display(value, unit, Rounding::HalfAwayFromZero)?;
        if let Some((num, den)) = literal.fraction.filter(|_| !exact) {
            return Err(MeasureError::InvalidFractionSyntax(format!(
                "{num}/{den}{unit} is finer than 1/{} {unit}",
                unit.sub_units()
            )));
        }
        Ok(quantity)
    }
}

impl std::str::FromStr for Quantity {
    type Err = MeasureError;

    /// Parse a literal such as `#92-5/8in` or `2.54 m`
    fn from_str(s: &str) -> Result<Self> {
        Quantity::from_literal(&crate::parser::parse_literal(s)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::HCN;

    #[test]
    fn test_mixed_number() {
        let lit = Literal::new(Decimal::from(92), "in").with_fraction(5, 8);
        let q = Quantity::from_literal(&lit).unwrap();
        // 92 5/8 in = 741/8 in
        assert_eq!(q.amount(), 741 * 20_160 / 8);
        let neg = Quantity::from_literal(&lit.negated()).unwrap();
        assert_eq!(neg.amount(), -q.amount());
    }

    #[test]
    fn test_third_of_a_cup_is_exact() {
        let lit = Literal::new(Decimal::ZERO, "cup").with_fraction(1, 3);
        let q = Quantity::from_literal(&lit).unwrap();
        assert_eq!(q.amount() * 3, HCN / 4);
    }

    #[test]
    fn test_si_fraction_is_rejected() {
        let lit = Literal::new(Decimal::ONE, "cm").with_fraction(1, 2);
        assert!(matches!(
            Quantity::from_literal(&lit),
            Err(MeasureError::InvalidFractionSyntax(_))
        ));
        let lit = Literal::new(Decimal::ZERO, "C").with_fraction(1, 2);
        assert!(matches!(
            Quantity::from_literal(&lit),
            Err(MeasureError::InvalidFractionSyntax(_))
        ));
    }

    #[test]
    fn test_malformed_fractions() {
        let zero = Literal::new(Decimal::ZERO, "in").with_fraction(1, 0);
        assert!(matches!(
            Quantity::from_literal(&zero),
            Err(MeasureError::InvalidFractionSyntax(_))
        ));
        let decimal_whole = Literal::new(Decimal::new(15, 1), "in").with_fraction(1, 2);
        assert!(matches!(
            Quantity::from_literal(&decimal_whole),
            Err(MeasureError::InvalidFractionSyntax(_))
        ));
    }

    #[test]
    fn test_fraction_off_the_storage_grid() {
        let tiny = Literal::new(Decimal::ZERO, "in").with_fraction(1, 1_000_000).negated();
        assert!(matches!(
            Quantity::from_literal(&tiny),
            Err(MeasureError::InvalidFractionSyntax(_))
        ));
        let eleventh = Literal::new(Decimal::ONE, "in").with_fraction(1, 11);
        assert!(matches!(
            Quantity::from_literal(&eleventh),
            Err(MeasureError::InvalidFractionSyntax(_))
        ));
        // decimals still round onto the grid
        let thousandth = Literal::new(Decimal::new(1, 3), "in");
        assert_eq!(Quantity::from_literal(&thousandth).unwrap().amount(), 20);
    }

    #[test]
    fn test_si_beyond_eighteen_places() {
        let tiny = Literal::new(Decimal::new(4, 19), "m");
        assert_eq!(
            Quantity::from_literal(&tiny).unwrap_err(),
            MeasureError::Overflow("more than 18 decimal places")
        );
        let edge = Literal::new(Decimal::new(4, 18), "m");
        assert_eq!(Quantity::from_literal(&edge).unwrap().scale(), Some(18));
        // 1 mm is 0.001 m, so 16 places in mm need 19 in metres
        let mm = Literal::new(Decimal::new(1, 16), "mm");
        assert!(matches!(Quantity::from_literal(&mm), Err(MeasureError::Overflow(_))));
    }

    #[test]
    fn test_unknown_suffix() {
        let lit = Literal::new(Decimal::ONE, "furlong");
        assert!(matches!(
            Quantity::from_literal(&lit),
            Err(MeasureError::UnknownUnitSuffix { .. })
        ));
    }
}
