//! Conversion engine
//!
//! Conversions inside one measurement system only move the display hint: the
//! stored amount is already in the system's base unit, so nothing rounds.
//! Crossing systems goes through the family's bridge ratio and is the only
//! place the engine ever rounds. When it does, the caller gets a
//! [`PrecisionLoss`] next to the result instead of an error.

use std::fmt;

use serde::Serialize;

use crate::error::{MeasureError, Result};
use crate::types::{bridge, Quantity, Ratio, Rounding, System, Unit, HCN};

/// Decimal places kept when a customary value is converted into SI
pub const CONVERSION_SCALE: u32 = 9;

/// Upper bound on the error a rounding conversion introduced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PrecisionLoss {
    /// Half a storage sub-unit of the target representation
    pub max_error: Ratio,
    /// Base unit `max_error` is expressed in
    pub unit: Unit,
}

impl fmt::Display for PrecisionLoss {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rounded to within {:.12} {}", self.max_error, self.unit)
    }
}

/// A converted quantity, with the rounding bound if conversion rounded
#[derive(Debug, Clone, Copy)]
pub struct Conversion {
    pub quantity: Quantity,
    pub loss: Option<PrecisionLoss>,
}

impl Conversion {
    fn exact(quantity: Quantity) -> Self {
        Self { quantity, loss: None }
    }

    pub fn is_exact(&self) -> bool {
        self.loss.is_none()
    }
}

impl Quantity {
    /// Convert to the unit with this suffix, dropping any rounding advisory
    pub fn to(&self, suffix: &str) -> Result<Quantity> {
        Ok(self.convert(suffix)?.quantity)
    }

    /// Convert to the unit with this suffix
    pub fn convert(&self, suffix: &str) -> Result<Conversion> {
        self.convert_to_unit(Unit::lookup(suffix)?)
    }

    pub fn to_unit(&self, unit: Unit) -> Result<Quantity> {
        Ok(self.convert_to_unit(unit)?.quantity)
    }

    pub fn convert_to_unit(&self, unit: Unit) -> Result<Conversion> {
        let family = self.family();
        if unit.family() != family {
            return Err(MeasureError::mismatch(family, unit.family(), "convert between"));
        }

        // Temperature scales share one storage; SI and customary units share
        // a base within their own system
        if unit.is_temperature() || unit.system() == self.system() {
            return Ok(Conversion::exact(self.with_hint(unit)));
        }

        let bridge = bridge(family).ok_or_else(|| {
            MeasureError::UnsupportedOperation(format!("{family} has no customary units"))
        })?;
        let canonical = self.canonical()?;
        let (base, max_error) = match unit.system() {
            System::Us => (
                canonical.checked_div(bridge)?,
                Ratio::new(1, 2 * i128::from(HCN))?,
            ),
            System::Si => (canonical, Ratio::new(1, 2 * 10i128.pow(CONVERSION_SCALE))?),
        };

        let (quantity, exact) = Quantity::from_base(base, unit, CONVERSION_SCALE, Rounding::HalfAwayFromZero)?;
        if exact {
            return Ok(Conversion::exact(quantity));
        }

        let base_unit = Unit::base(family, unit.system()).unwrap_or(unit);
        tracing::debug!(
            family = %family,
            from = %self.hint(),
            to = %unit,
            bound = max_error.to_f64(),
            "cross-system conversion rounded"
        );
        Ok(Conversion {
            quantity,
            loss: Some(PrecisionLoss {
                max_error,
                unit: base_unit,
            }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn q(s: &str) -> Quantity {
        Quantity::from_str(s).unwrap()
    }

    #[test]
    fn test_same_system_is_exact() {
        let c = q("254cm").convert("m").unwrap();
        assert!(c.is_exact());
        assert_eq!(c.quantity.unit_suffix(), "m");
        assert_eq!(c.quantity.amount(), 254);
        assert_eq!(c.quantity.scale(), Some(2));

        let c = q("3ft").convert("yd").unwrap();
        assert!(c.is_exact());
        assert_eq!(c.quantity.value(), 1.0);
    }

    #[test]
    fn test_inch_to_metric_is_exact() {
        let c = q("1in").convert("mm").unwrap();
        assert!(c.is_exact());
        assert_eq!(c.quantity.display_value(), Ratio::new(254, 10).unwrap());
    }

    #[test]
    fn test_metric_to_inch_rounds() {
        let c = q("1mm").convert("in").unwrap();
        let loss = c.loss.expect("1 mm is not a whole number of sub-units");
        assert_eq!(loss.unit.suffix(), "yd");
        assert_eq!(loss.max_error, Ratio::new(1, 2 * 725_760).unwrap());
        let error = c
            .quantity
            .canonical()
            .unwrap()
            .checked_sub(Ratio::new(1, 1000).unwrap())
            .unwrap()
            .abs()
            .unwrap();
        // half a sub-unit of a yard, in metres
        let bound = loss.max_error.checked_mul(bridge(crate::types::Family::Length).unwrap()).unwrap();
        assert!(error <= bound);
    }

    #[test]
    fn test_pound_to_grams() {
        let c = Quantity::pounds(Decimal::ONE).unwrap().convert("g").unwrap();
        assert!(c.is_exact());
        assert_eq!(c.quantity.to_decimal_value().unwrap(), Decimal::from_str("453.59237").unwrap());
    }

    #[test]
    fn test_temperature_scales_never_round() {
        let c = q("98.6F").convert("C").unwrap();
        assert!(c.is_exact());
        assert_eq!(c.quantity.display_value(), Ratio::from_integer(37));
        assert_eq!(q("0C").to("K").unwrap().display_value().to_string(), "273.15");
    }

    #[test]
    fn test_cross_family_conversion_fails() {
        assert!(matches!(
            q("1kg").convert("m"),
            Err(MeasureError::FamilyMismatch { .. })
        ));
        assert!(matches!(
            q("1kg").convert("kgz"),
            Err(MeasureError::UnknownUnitSuffix { .. })
        ));
    }
}
