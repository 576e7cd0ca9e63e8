//! The quantity value type

use rust_decimal::Decimal;
use serde::Serialize;

use super::ratio::{pow10, Ratio, Rounding};
use super::temperature;
use super::unit::{bridge, Family, System, Unit, HCN};
use crate::error::{MeasureError, Result};

/// Largest decimal scale a `Decimal` quantity may carry
pub const MAX_SCALE: u32 = 18;

/// A physical quantity.
///
/// The variant is the storage representation; `hint` is the unit the value
/// was expressed in. The hint affects display only: `254cm == 2.54m`.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(tag = "repr", rename_all = "lowercase")]
pub enum Quantity {
    /// SI value: `amount / 10^scale` base units (metre, gram, litre, byte)
    Decimal {
        amount: i64,
        scale: i8,
        family: Family,
        hint: Unit,
    },
    /// US customary value: `amount / HCN` base units (yard, ounce, quart)
    Customary {
        amount: i64,
        family: Family,
        hint: Unit,
    },
    /// Temperature: `amount / 900` kelvin, whatever the scale
    Temperature { amount: i64, hint: Unit },
}

impl Quantity {
    /// Generic constructor: `Quantity::unit(dec!(2.54), "m")`
    pub fn unit(value: Decimal, suffix: &str) -> Result<Self> {
        Self::from_value(value, Unit::lookup(suffix)?)
    }

    /// Construct from a constructor name such as `"feet"` or `"kilograms"`
    pub fn named(name: &str, value: Decimal) -> Result<Self> {
        let unit = Unit::from_name(name).ok_or_else(|| MeasureError::UnknownUnitSuffix {
            suffix: name.to_string(),
            suggestion: None,
        })?;
        Self::from_value(value, unit)
    }

    pub fn from_value(value: Decimal, unit: Unit) -> Result<Self> {
        Ok(Self::from_display(Ratio::from_decimal(value)?, unit, Rounding::HalfAwayFromZero)?.0)
    }

    /// Build a quantity from an exact value in `unit`.
    ///
    /// Returns whether the value was stored without rounding. SI values keep
    /// up to [`MAX_SCALE`] decimal places; one that needs more is an
    /// `Overflow`. Customary and temperature values round onto their grid.
    pub(crate) fn from_display(value: Ratio, unit: Unit, mode: Rounding) -> Result<(Self, bool)> {
        if unit.is_temperature() {
            let amount = temperature::to_base(value, unit, mode)?;
            let exact = temperature::from_base(amount, unit) == value;
            return Ok((Self::Temperature { amount, hint: unit }, exact));
        }
        let base = value.checked_mul(unit.ratio())?;
        let (quantity, exact) = Self::from_base(base, unit, MAX_SCALE, mode)?;
        if !exact && !unit.is_customary() {
            return Err(MeasureError::Overflow("more than 18 decimal places"));
        }
        Ok((quantity, exact))
    }

    /// Build a quantity from an exact value in base units of `unit`'s system
    pub(crate) fn from_base(base: Ratio, unit: Unit, max_scale: u32, mode: Rounding) -> Result<(Self, bool)> {
        let family = unit.family();
        if unit.is_customary() {
            let scaled = base.checked_mul(Ratio::from_integer(HCN.into()))?;
            let amount = scaled.round(mode);
            let amount = i64::try_from(amount).map_err(|_| MeasureError::Overflow("amount exceeds i64"))?;
            return Ok((
                Self::Customary {
                    amount,
                    family,
                    hint: unit,
                },
                scaled.is_integer(),
            ));
        }
        let (mantissa, scale, exact) = base.to_scaled(max_scale, mode)?;
        let (amount, scale) = fit_decimal(mantissa, scale)?;
        Ok((
            Self::Decimal {
                amount,
                scale,
                family,
                hint: unit,
            },
            exact,
        ))
    }

    pub fn family(&self) -> Family {
        match self {
            Self::Decimal { family, .. } | Self::Customary { family, .. } => *family,
            Self::Temperature { .. } => Family::Temperature,
        }
    }

    /// The display-hint unit
    pub fn hint(&self) -> Unit {
        match self {
            Self::Decimal { hint, .. } | Self::Customary { hint, .. } | Self::Temperature { hint, .. } => *hint,
        }
    }

    /// Display-hint suffix, e.g. `"cm"`
    pub fn unit_suffix(&self) -> &'static str {
        self.hint().suffix()
    }

    pub fn system(&self) -> System {
        self.hint().system()
    }

    /// Raw stored amount
    pub fn amount(&self) -> i64 {
        match self {
            Self::Decimal { amount, .. } | Self::Customary { amount, .. } | Self::Temperature { amount, .. } => {
                *amount
            }
        }
    }

    /// Decimal scale, for `Decimal` quantities only
    pub fn scale(&self) -> Option<i8> {
        match self {
            Self::Decimal { scale, .. } => Some(*scale),
            _ => None,
        }
    }

    /// Decoded value in the display-hint unit, as a float
    pub fn value(&self) -> f64 {
        self.display_value().to_f64()
    }

    /// Value in the display-hint unit as a `Decimal`
    pub fn to_decimal_value(&self) -> Result<Decimal> {
        self.display_value().to_decimal()
    }

    /// Exact value in the display-hint unit
    pub fn display_value(&self) -> Ratio {
        self.value_in(self.hint())
    }

    /// Exact value in `unit` of the same system (and, for temperature, any scale)
    pub(crate) fn value_in(&self, unit: Unit) -> Ratio {
        match self {
            Self::Temperature { amount, .. } => temperature::from_base(*amount, unit),
            Self::Customary { amount, .. } => {
                Ratio::new((*amount).into(), unit.sub_units().into()).unwrap_or(Ratio::ZERO)
            }
            Self::Decimal { .. } => self
                .base_value()
                .checked_div(unit.ratio())
                .unwrap_or(Ratio::ZERO),
        }
    }

    /// Exact value in base units of the quantity's own representation
    pub(crate) fn base_value(&self) -> Ratio {
        let (amount, den) = match self {
            Self::Decimal { amount, scale, .. } => (*amount, pow10(*scale as u32).unwrap_or(1)),
            Self::Customary { amount, .. } => (*amount, HCN.into()),
            Self::Temperature { amount, .. } => (*amount, temperature::SUB_UNITS_PER_KELVIN.into()),
        };
        Ratio::new(amount.into(), den).unwrap_or(Ratio::ZERO)
    }

    /// Exact value in the family's SI base unit (kelvin for temperature).
    /// Used for comparisons, which never round.
    pub(crate) fn canonical(&self) -> Result<Ratio> {
        match self {
            Self::Customary { family, .. } => {
                let bridge = bridge(*family).ok_or(MeasureError::UnsupportedOperation(format!(
                    "{family} has no customary bridge"
                )))?;
                self.base_value().checked_mul(bridge)
            }
            _ => Ok(self.base_value()),
        }
    }

    pub fn is_zero(&self) -> bool {
        self.amount() == 0
    }

    pub fn is_negative(&self) -> bool {
        match self {
            Self::Temperature { .. } => self.display_value().is_negative(),
            _ => self.amount() < 0,
        }
    }

    /// Same value and representation with another display hint of the same system
    pub(crate) fn with_hint(self, unit: Unit) -> Self {
        match self {
            Self::Decimal {
                amount,
                scale,
                family,
                ..
            } => Self::Decimal {
                amount,
                scale,
                family,
                hint: unit,
            },
            Self::Customary { amount, family, .. } => Self::Customary {
                amount,
                family,
                hint: unit,
            },
            Self::Temperature { amount, .. } => Self::Temperature { amount, hint: unit },
        }
    }

    /// Replace the stored amount, keeping everything else
    pub(crate) fn with_amount(self, amount: i64) -> Self {
        match self {
            Self::Decimal {
                scale, family, hint, ..
            } => Self::Decimal {
                amount,
                scale,
                family,
                hint,
            },
            Self::Customary { family, hint, .. } => Self::Customary {
                amount,
                family,
                hint,
            },
            Self::Temperature { hint, .. } => Self::Temperature { amount, hint },
        }
    }
}

/// Fit a decimal mantissa into `i64` and `MAX_SCALE`, dropping trailing zeros
/// where needed. Never rounds.
pub(crate) fn fit_decimal(mut mantissa: i128, mut scale: u32) -> Result<(i64, i8)> {
    while scale > 0 && mantissa % 10 == 0 && (scale > MAX_SCALE || i64::try_from(mantissa).is_err()) {
        mantissa /= 10;
        scale -= 1;
    }
    if scale > MAX_SCALE {
        return Err(MeasureError::Overflow("more than 18 decimal places"));
    }
    let amount = i64::try_from(mantissa).map_err(|_| MeasureError::Overflow("amount exceeds i64"))?;
    Ok((amount, scale as i8))
}

macro_rules! unit_constructors {
    ($($name:ident => $suffix:literal),* $(,)?) => {
        impl Quantity {
            $(
                #[doc = concat!("A quantity in `", $suffix, "`")]
                pub fn $name(value: impl Into<Decimal>) -> Result<Self> {
                    Self::unit(value.into(), $suffix)
                }
            )*
        }
    };
}

unit_constructors! {
    millimetres => "mm",
    centimetres => "cm",
    metres => "m",
    kilometres => "km",
    inches => "in",
    feet => "ft",
    yards => "yd",
    miles => "mi",
    milligrams => "mg",
    grams => "g",
    kilograms => "kg",
    ounces => "oz",
    pounds => "lb",
    millilitres => "mL",
    centilitres => "cL",
    decilitres => "dL",
    litres => "L",
    teaspoons => "tsp",
    tablespoons => "tbsp",
    fluid_ounces => "floz",
    cups => "cup",
    pints => "pt",
    quarts => "qt",
    gallons => "gal",
    bytes => "B",
    kilobytes => "kB",
    megabytes => "MB",
    gigabytes => "GB",
    terabytes => "TB",
    kibibytes => "KiB",
    mebibytes => "MiB",
    gibibytes => "GiB",
    tebibytes => "TiB",
    kelvin => "K",
    celsius => "C",
    fahrenheit => "F",
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_decimal_storage() {
        let q = Quantity::centimetres(dec("254")).unwrap();
        assert_eq!(q.amount(), 254);
        assert_eq!(q.scale(), Some(2));
        assert_eq!(q.family(), Family::Length);
        assert_eq!(q.unit_suffix(), "cm");

        let q = Quantity::kilometres(dec("1.5")).unwrap();
        assert_eq!((q.amount(), q.scale()), (1500, Some(0)));
    }

    #[test]
    fn test_customary_storage() {
        let q = Quantity::inches(1).unwrap();
        assert_eq!(q.amount(), 20_160);
        assert_eq!(q.scale(), None);
        assert_eq!(q.system(), System::Us);

        let q = Quantity::pounds(dec("2.5")).unwrap();
        assert_eq!(q.amount(), 40 * HCN);
    }

    #[test]
    fn test_temperature_storage() {
        let q = Quantity::celsius(100).unwrap();
        assert_eq!(q.amount(), 335_835);
        assert_eq!(q.family(), Family::Temperature);
        assert_eq!(q.system(), System::Si);
        assert_eq!(Quantity::fahrenheit(212).unwrap().amount(), 335_835);
    }

    #[test]
    fn test_value_is_in_display_unit() {
        assert_eq!(Quantity::metres(dec("12.5")).unwrap().value(), 12.5);
        assert_eq!(Quantity::feet(3).unwrap().value(), 3.0);
        assert_eq!(Quantity::fahrenheit(dec("98.6")).unwrap().value(), 98.6);
    }

    #[test]
    fn test_named_and_generic_constructors() {
        let a = Quantity::named("meters", dec("5")).unwrap();
        let b = Quantity::unit(dec("5"), "m").unwrap();
        assert_eq!(a.amount(), b.amount());
        assert_eq!(a.unit_suffix(), "m");
        assert!(matches!(
            Quantity::unit(dec("1"), "parsecs"),
            Err(MeasureError::UnknownUnitSuffix { .. })
        ));
        assert!(Quantity::named("furlongs", dec("1")).is_err());
    }

    #[test]
    fn test_overflow_is_reported() {
        let err = Quantity::miles(i64::MAX).unwrap_err();
        assert!(matches!(err, MeasureError::Overflow(_)));
    }

    #[test]
    fn test_fit_decimal_drops_trailing_zeros_only() {
        assert_eq!(fit_decimal(1_501, 20).unwrap_err(), MeasureError::Overflow("more than 18 decimal places"));
        assert_eq!(fit_decimal(1_500, 20).unwrap(), (15, 18));
        assert_eq!(fit_decimal(1_500_000, 20).unwrap(), (15_000, 18));
        assert_eq!(fit_decimal(42, 3).unwrap(), (42, 3));
    }
}
