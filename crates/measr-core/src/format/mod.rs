//! Formatter: quantities to text
//!
//! Three renderings, from strict to friendly:
//!
//! - [`Quantity::repr`] is exact and parses back to the same quantity (`#92-5/8in`)
//! - [`Quantity::format`] follows [`FormatOptions`]: common fractions for
//!   customary values, decimals otherwise (`92-5/8in`, `1.83m`)
//! - [`Quantity::to_fraction`] always shows customary values as fractions,
//!   with `"` and `'` for inches and feet

mod fraction;

pub use fraction::{Fraction, COMMON_DENOMINATORS};

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{Family, Quantity, Ratio, Rounding, System, Unit};

/// Decimal places shown for SI and temperature values by default
pub const DEFAULT_PLACES: u32 = 6;

/// Decimal places shown when a customary value has no common fraction
pub const FALLBACK_PLACES: u32 = 4;

/// Largest number of decimal places `repr` writes for a value that has no
/// finite decimal expansion
const REPR_PLACES: u32 = 9;

/// Places a decimal literal can hold
const LITERAL_MAX_SCALE: u32 = 28;

/// Formatting preferences
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatOptions {
    /// Fixed number of decimal places for decimal renderings
    pub precision: Option<u32>,
    /// Show customary values as common fractions when possible
    pub fractions: bool,
    /// Use `"` and `'` for inches and feet
    pub symbols: bool,
    /// Put a space between number and unit
    pub space: bool,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            precision: None,
            fractions: true,
            symbols: false,
            space: false,
        }
    }
}

impl FormatOptions {
    pub fn with_precision(mut self, places: u32) -> Self {
        self.precision = Some(places);
        self
    }

    pub fn decimal(mut self) -> Self {
        self.fractions = false;
        self
    }
}

/// Plain value and unit, for serialization
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuantityDict {
    pub value: f64,
    pub unit: Unit,
    pub family: Family,
    pub system: System,
}

/// Internal representation, for debugging
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Inspection {
    pub kind: &'static str,
    pub amount: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale: Option<i8>,
    pub family: Family,
    pub system: System,
    pub display_hint: Unit,
    /// Whether the default rendering shows the value without rounding
    pub exact: bool,
}

impl Quantity {
    pub fn format(&self, options: &FormatOptions) -> String {
        let unit = self.hint();
        let number = match self {
            Quantity::Customary { amount, .. } => {
                let fraction = Fraction::reduce(*amount, unit.sub_units());
                if options.fractions && fraction.is_common() {
                    fraction.render("-")
                } else {
                    let places = options.precision.unwrap_or(FALLBACK_PLACES);
                    decimal_string(&self.display_value(), places, options.precision.is_none())
                }
            }
            _ => {
                let places = options.precision.unwrap_or(DEFAULT_PLACES);
                decimal_string(&self.display_value(), places, options.precision.is_none())
            }
        };
        match unit.symbol().filter(|_| options.symbols) {
            Some(symbol) => format!("{number}{symbol}"),
            None if options.space => format!("{number} {unit}"),
            None => format!("{number}{unit}"),
        }
    }

    /// Round-trippable literal: `#12.3m`, `#3/8in`, `#-92-5/8in`.
    ///
    /// An SI value whose expansion in its display unit is too long for a
    /// literal (`1B` in TiB) is written in the family's base unit instead.
    pub fn repr(&self) -> String {
        let hint = self.hint();
        let (number, unit) = match self {
            Quantity::Customary { amount, .. } => (Fraction::reduce(*amount, hint.sub_units()).render("-"), hint),
            Quantity::Decimal { family, .. } => match literal_decimal(&self.display_value()) {
                Some(number) => (number, hint),
                // at most MAX_SCALE places and an i64 mantissa
                None => (
                    exact_decimal_string(&self.base_value()),
                    Unit::base(*family, System::Si).unwrap_or(hint),
                ),
            },
            Quantity::Temperature { .. } => (exact_decimal_string(&self.display_value()), hint),
        };
        format!("#{number}{unit}")
    }

    /// Fraction rendering of any denominator for customary values; SI and
    /// temperature values render as decimals.
    pub fn to_fraction(&self) -> String {
        match self {
            Quantity::Customary { amount, hint, .. } => {
                let fraction = Fraction::reduce(*amount, hint.sub_units());
                format!("{}{}", fraction.render("-"), hint.symbol().unwrap_or(hint.suffix()))
            }
            _ => self.format(&FormatOptions::default()),
        }
    }

    pub fn to_dict(&self) -> QuantityDict {
        QuantityDict {
            value: self.value(),
            unit: self.hint(),
            family: self.family(),
            system: self.system(),
        }
    }

    pub fn inspect(&self) -> Inspection {
        let kind = match self {
            Quantity::Decimal { .. } => "decimal",
            Quantity::Customary { .. } => "customary",
            Quantity::Temperature { .. } => "temperature",
        };
        Inspection {
            kind,
            amount: self.amount(),
            scale: self.scale(),
            family: self.family(),
            system: self.system(),
            display_hint: self.hint(),
            exact: self.renders_exactly(),
        }
    }

    fn renders_exactly(&self) -> bool {
        let value = self.display_value();
        let places = match self {
            Quantity::Customary { amount, .. } if Fraction::reduce(*amount, self.hint().sub_units()).is_common() => {
                return true
            }
            Quantity::Customary { .. } => FALLBACK_PLACES,
            _ => DEFAULT_PLACES,
        };
        value.exact_scale().is_some_and(|s| s <= places)
    }
}

impl fmt::Display for Quantity {
    /// `{}` uses the default options; `{:.N}` fixes the decimal places
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let options = FormatOptions {
            precision: f.precision().map(|p| p as u32),
            ..FormatOptions::default()
        };
        f.write_str(&self.format(&options))
    }
}

/// Exact decimal expansion when one exists, otherwise [`REPR_PLACES`] places
fn exact_decimal_string(value: &Ratio) -> String {
    let places = value.exact_scale().unwrap_or(REPR_PLACES);
    decimal_string(value, places, true)
}

/// Exact expansion of `value`, if a literal can carry it without rounding
fn literal_decimal(value: &Ratio) -> Option<String> {
    let scale = value.exact_scale().filter(|s| *s <= LITERAL_MAX_SCALE)?;
    let (mantissa, scale, _) = value.to_scaled(scale, Rounding::TowardZero).ok()?;
    Decimal::try_from_i128_with_scale(mantissa, scale).ok()?;
    Some(decimal_string(value, scale, true))
}

/// Decimal rendering by long division, rounding half away from zero at
/// `places`. With `trim`, trailing zeros (and a bare point) are dropped.
pub(crate) fn decimal_string(value: &Ratio, places: u32, trim: bool) -> String {
    let num = value.numer().unsigned_abs();
    let den = value.denom().unsigned_abs();
    let mut whole = num / den;
    let mut rem = num % den;

    let mut digits = Vec::with_capacity(places as usize);
    for _ in 0..places {
        let Some(shifted) = rem.checked_mul(10) else {
            return format!("{:.*}", places as usize, value.to_f64());
        };
        digits.push((shifted / den) as u8);
        rem = shifted % den;
    }

    // rem < den, so doubling fits in u128
    if rem * 2 >= den {
        let mut carry = true;
        for digit in digits.iter_mut().rev() {
            if *digit == 9 {
                *digit = 0;
            } else {
                *digit += 1;
                carry = false;
                break;
            }
        }
        if carry {
            whole += 1;
        }
    }

    if trim {
        while digits.last() == Some(&0) {
            digits.pop();
        }
    }

    let is_zero = whole == 0 && digits.iter().all(|d| *d == 0);
    let mut out = String::new();
    if value.is_negative() && !is_zero {
        out.push('-');
    }
    out.push_str(&whole.to_string());
    if !digits.is_empty() {
        out.push('.');
        out.extend(digits.iter().map(|d| char::from(b'0' + d)));
    }
    out
}
