//! Temperature storage
//!
//! Temperatures are stored as 1/900 kelvin. 900 is divisible by both 5 and 9,
//! so the Celsius and Fahrenheit scales land on whole sub-units:
//!
//! ```text
//! base       = (celsius + 273.15) * 900    = celsius * 900 + 245_835
//! base       = (fahrenheit + 459.67) * 500 = fahrenheit * 500 + 229_835
//! celsius    = (base - 245_835) / 900
//! fahrenheit = (base - 229_835) / 500
//! ```
//!
//! Temperature values are ordinary numbers: there is no distinction between a
//! temperature point and a temperature difference.

use rust_decimal::Decimal;

use super::ratio::{Ratio, Rounding};
use super::unit::Unit;
use crate::error::{MeasureError, Result};

/// Storage sub-units per kelvin (and per degree Celsius)
pub const SUB_UNITS_PER_KELVIN: i64 = 900;

/// Storage sub-units per degree Fahrenheit
pub const SUB_UNITS_PER_FAHRENHEIT: i64 = 500;

/// 0 °C in storage sub-units (273.15 K)
pub const CELSIUS_ZERO: i64 = 245_835;

/// 0 °F in storage sub-units (459.67 °R)
pub const FAHRENHEIT_ZERO: i64 = 229_835;

/// Storage sub-units per degree of `unit`
pub(crate) fn per_degree(unit: Unit) -> i64 {
    let (num, den) = unit.def().ratio;
    SUB_UNITS_PER_KELVIN * num / den
}

/// Degrees of `unit` to storage sub-units
pub(crate) fn to_base(degrees: Ratio, unit: Unit, mode: Rounding) -> Result<i64> {
    let scaled = degrees
        .checked_mul(Ratio::from_integer(per_degree(unit).into()))?
        .round(mode);
    let base = scaled
        .checked_add(unit.def().zero.into())
        .ok_or(MeasureError::Overflow("temperature"))?;
    i64::try_from(base).map_err(|_| MeasureError::Overflow("temperature"))
}

/// Storage sub-units to degrees of `unit`, exactly
pub(crate) fn from_base(amount: i64, unit: Unit) -> Ratio {
    let offset = i128::from(amount) - i128::from(unit.def().zero);
    // per_degree is never zero for a registered temperature scale
    Ratio::new(offset, per_degree(unit).into()).unwrap_or(Ratio::ZERO)
}

fn degrees(value: Decimal, per_degree: i64, zero: i64) -> Result<i64> {
    let base = Ratio::from_decimal(value)?
        .checked_mul(Ratio::from_integer(per_degree.into()))?
        .round(Rounding::HalfAwayFromZero)
        .checked_add(zero.into())
        .ok_or(MeasureError::Overflow("temperature"))?;
    i64::try_from(base).map_err(|_| MeasureError::Overflow("temperature"))
}

pub fn celsius_to_base(celsius: Decimal) -> Result<i64> {
    degrees(celsius, SUB_UNITS_PER_KELVIN, CELSIUS_ZERO)
}

pub fn fahrenheit_to_base(fahrenheit: Decimal) -> Result<i64> {
    degrees(fahrenheit, SUB_UNITS_PER_FAHRENHEIT, FAHRENHEIT_ZERO)
}

pub fn kelvin_to_base(kelvin: Decimal) -> Result<i64> {
    degrees(kelvin, SUB_UNITS_PER_KELVIN, 0)
}

pub fn base_to_celsius(base: i64) -> Result<Ratio> {
    Ratio::new(i128::from(base) - i128::from(CELSIUS_ZERO), SUB_UNITS_PER_KELVIN.into())
}

pub fn base_to_fahrenheit(base: i64) -> Result<Ratio> {
    Ratio::new(i128::from(base) - i128::from(FAHRENHEIT_ZERO), SUB_UNITS_PER_FAHRENHEIT.into())
}

pub fn base_to_kelvin(base: i64) -> Result<Ratio> {
    Ratio::new(base.into(), SUB_UNITS_PER_KELVIN.into())
}
