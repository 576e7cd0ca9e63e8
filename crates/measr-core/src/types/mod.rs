//! Value types for measr

mod literal;
mod quantity;
pub mod ratio;
pub mod temperature;
pub mod unit;

pub use literal::Literal;
pub(crate) use quantity::fit_decimal;
pub use quantity::{Quantity, MAX_SCALE};
pub use ratio::{Ratio, Rounding};
pub use unit::{bridge, Family, System, Unit, UnitDef, HCN, UNITS};
