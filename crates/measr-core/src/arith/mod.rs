//! Arithmetic engine
//!
//! All binary operations between quantities follow the left-operand rule: the
//! right operand is first converted into the left operand's unit (and so its
//! representation), then the operation runs on integers. Within one
//! representation nothing rounds.

use std::cmp::Ordering;
use std::fmt;

use rust_decimal::Decimal;

use crate::error::{MeasureError, Result};
use crate::format::FormatOptions;
use crate::types::{fit_decimal, Quantity, Ratio, Rounding, Unit, MAX_SCALE};

/// Smallest scale a `Decimal` quantity is widened to when divided by a scalar
const DIVISION_SCALE: u32 = 9;

impl Quantity {
    pub fn checked_add(&self, rhs: &Quantity) -> Result<Quantity> {
        self.combine(rhs, "add", Ratio::checked_add, i64::checked_add)
    }

    pub fn checked_sub(&self, rhs: &Quantity) -> Result<Quantity> {
        self.combine(rhs, "subtract", Ratio::checked_sub, i64::checked_sub)
    }

    fn combine(
        &self,
        rhs: &Quantity,
        operation: &'static str,
        ratio_op: fn(Ratio, Ratio) -> Result<Ratio>,
        int_op: fn(i64, i64) -> Option<i64>,
    ) -> Result<Quantity> {
        if self.family() != rhs.family() {
            return Err(MeasureError::mismatch(self.family(), rhs.family(), operation));
        }
        let rhs = rhs.to_unit(self.hint())?;
        match (self, &rhs) {
            (
                Quantity::Decimal {
                    amount: l_amount,
                    scale: l_scale,
                    ..
                },
                Quantity::Decimal {
                    amount: r_amount,
                    scale: r_scale,
                    ..
                },
            ) => {
                let scale = (*l_scale).max(*r_scale) as u32;
                let left = widen(*l_amount, *l_scale, scale)?;
                let right = widen(*r_amount, *r_scale, scale)?;
                let sum = ratio_op(Ratio::from_integer(left), Ratio::from_integer(right))?;
                let (amount, scale) = fit_decimal(sum.numer(), scale)?;
                Ok(self.with_decimal(amount, scale))
            }
            (Quantity::Customary { amount, .. }, Quantity::Customary { amount: r_amount, .. }) => {
                let amount = int_op(*amount, *r_amount).ok_or(MeasureError::Overflow("customary amount"))?;
                Ok(self.with_amount(amount))
            }
            (Quantity::Temperature { .. }, Quantity::Temperature { .. }) => {
                // Ordinary numbers on the left operand's scale
                let value = ratio_op(self.display_value(), rhs.display_value())?;
                Ok(Quantity::from_display(value, self.hint(), Rounding::HalfAwayFromZero)?.0)
            }
            _ => Err(MeasureError::UnsupportedOperation(format!(
                "cannot {operation} {} and {} representations",
                self.family(),
                rhs.family()
            ))),
        }
    }

    pub fn checked_neg(&self) -> Result<Quantity> {
        match self {
            Quantity::Temperature { .. } => {
                let value = self.display_value().checked_neg()?;
                Ok(Quantity::from_display(value, self.hint(), Rounding::HalfAwayFromZero)?.0)
            }
            _ => {
                let amount = self.amount().checked_neg().ok_or(MeasureError::Overflow("negation"))?;
                Ok(self.with_amount(amount))
            }
        }
    }

    /// Absolute value, keeping hint and representation
    pub fn abs(&self) -> Result<Quantity> {
        if self.is_negative() {
            self.checked_neg()
        } else {
            Ok(*self)
        }
    }

    /// Multiply by a dimensionless scalar.
    ///
    /// Exact for SI values. Customary and temperature values truncate toward
    /// zero at the storage sub-unit when the scalar is fractional.
    pub fn checked_mul(&self, scalar: Decimal) -> Result<Quantity> {
        match self {
            Quantity::Decimal { amount, scale, .. } => {
                let mantissa = i128::from(*amount)
                    .checked_mul(scalar.mantissa())
                    .ok_or(MeasureError::Overflow("multiplication"))?;
                let (amount, scale) = fit_decimal(mantissa, *scale as u32 + scalar.scale())?;
                Ok(self.with_decimal(amount, scale))
            }
            _ => self.scale_by(Ratio::from_decimal(scalar)?),
        }
    }

    /// Divide by a dimensionless scalar, truncating toward zero
    pub fn checked_div(&self, scalar: Decimal) -> Result<Quantity> {
        if scalar.is_zero() {
            return Err(MeasureError::DivisionByZero);
        }
        let factor = Ratio::ONE.checked_div(Ratio::from_decimal(scalar)?)?;
        match self {
            Quantity::Decimal { scale, .. } => {
                let value = self.base_value().checked_mul(factor)?;
                let max_scale = (*scale as u32).max(DIVISION_SCALE).min(MAX_SCALE);
                let (mantissa, scale, _) = value.to_scaled(max_scale, Rounding::TowardZero)?;
                let (amount, scale) = fit_decimal(mantissa, scale)?;
                Ok(self.with_decimal(amount, scale))
            }
            _ => self.scale_by(factor),
        }
    }

    fn scale_by(&self, factor: Ratio) -> Result<Quantity> {
        match self {
            Quantity::Temperature { .. } => {
                let value = self.display_value().checked_mul(factor)?;
                Ok(Quantity::from_display(value, self.hint(), Rounding::TowardZero)?.0)
            }
            _ => {
                let amount = Ratio::from_integer(self.amount().into())
                    .checked_mul(factor)?
                    .round(Rounding::TowardZero);
                let amount = i64::try_from(amount).map_err(|_| MeasureError::Overflow("multiplication"))?;
                Ok(self.with_amount(amount))
            }
        }
    }

    /// Divide two quantities of one family, giving a dimensionless ratio.
    ///
    /// Temperatures divide as numbers on the left operand's scale.
    pub fn ratio_to(&self, rhs: &Quantity) -> Result<Ratio> {
        if self.family() != rhs.family() {
            return Err(MeasureError::mismatch(self.family(), rhs.family(), "divide"));
        }
        match self {
            Quantity::Temperature { .. } => self.display_value().checked_div(rhs.value_in(self.hint())),
            _ => self.canonical()?.checked_div(rhs.canonical()?),
        }
    }

    /// Exact comparison across systems. `None` between families.
    pub fn compare(&self, rhs: &Quantity) -> Option<Ordering> {
        if self.family() != rhs.family() {
            return None;
        }
        Some(self.canonical().ok()?.cmp(&rhs.canonical().ok()?))
    }

    fn with_decimal(&self, amount: i64, scale: i8) -> Quantity {
        Quantity::Decimal {
            amount,
            scale,
            family: self.family(),
            hint: self.hint(),
        }
    }
}

/// Rescale a decimal mantissa from `from` to `to` places (`to >= from`)
fn widen(amount: i64, from: i8, to: u32) -> Result<i128> {
    let factor = crate::types::ratio::pow10(to - from as u32).ok_or(MeasureError::Overflow("scale"))?;
    i128::from(amount)
        .checked_mul(factor)
        .ok_or(MeasureError::Overflow("scale"))
}

impl PartialEq for Quantity {
    /// Equal when both reduce to the same base amount; display hints are ignored
    fn eq(&self, other: &Self) -> bool {
        self.compare(other) == Some(Ordering::Equal)
    }
}

impl PartialOrd for Quantity {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.compare(other)
    }
}

/// Binary operators between operands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl BinaryOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Subtract => "-",
            BinaryOp::Multiply => "*",
            BinaryOp::Divide => "/",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
        }
    }

    fn verb(&self) -> &'static str {
        match self {
            BinaryOp::Add => "add",
            BinaryOp::Subtract => "subtract",
            BinaryOp::Multiply => "multiply",
            BinaryOp::Divide => "divide",
            _ => "compare",
        }
    }

    pub fn is_comparison(&self) -> bool {
        !matches!(
            self,
            BinaryOp::Add | BinaryOp::Subtract | BinaryOp::Multiply | BinaryOp::Divide
        )
    }

    fn test(&self, ordering: Ordering) -> bool {
        match self {
            BinaryOp::Eq => ordering == Ordering::Equal,
            BinaryOp::Ne => ordering != Ordering::Equal,
            BinaryOp::Lt => ordering == Ordering::Less,
            BinaryOp::Le => ordering != Ordering::Greater,
            BinaryOp::Gt => ordering == Ordering::Greater,
            BinaryOp::Ge => ordering != Ordering::Less,
            _ => false,
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Either side of a binary operation
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Operand {
    Quantity(Quantity),
    Scalar(Decimal),
}

impl From<Quantity> for Operand {
    fn from(q: Quantity) -> Self {
        Operand::Quantity(q)
    }
}

impl From<Decimal> for Operand {
    fn from(d: Decimal) -> Self {
        Operand::Scalar(d)
    }
}

impl Operand {
    fn describe(&self) -> String {
        match self {
            Operand::Quantity(q) => q.family().to_string(),
            Operand::Scalar(_) => "number".to_string(),
        }
    }
}

/// Result of a binary operation
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Outcome {
    Quantity(Quantity),
    /// Dimensionless ratio of two quantities
    Ratio(Ratio),
    /// Plain number arithmetic
    Scalar(Decimal),
    Bool(bool),
}

impl Outcome {
    pub fn render(&self, options: &FormatOptions) -> String {
        match self {
            Outcome::Quantity(q) => q.format(options),
            Outcome::Ratio(r) => match options.precision {
                Some(p) => format!("{r:.*}", p as usize),
                None => r.to_string(),
            },
            Outcome::Scalar(d) => d.normalize().to_string(),
            Outcome::Bool(b) => b.to_string(),
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(&FormatOptions::default()))
    }
}

/// Which unit a quantity result is displayed in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResultUnit {
    /// The left operand's unit (and representation)
    #[default]
    Left,
    /// An explicit unit of the same family
    Unit(Unit),
}

/// The binary-operation entry point.
///
/// `rule` picks the display unit of a quantity result; the left operand's
/// unit is always used for the computation itself.
pub fn apply(op: BinaryOp, left: Operand, right: Operand, rule: ResultUnit) -> Result<Outcome> {
    let outcome = match (left, right) {
        (Operand::Quantity(l), Operand::Quantity(r)) => quantities(op, &l, &r)?,
        (Operand::Quantity(q), Operand::Scalar(s)) => match op {
            BinaryOp::Multiply => Outcome::Quantity(q.checked_mul(s)?),
            BinaryOp::Divide => Outcome::Quantity(q.checked_div(s)?),
            _ => return Err(unsupported(op, &left, &right)),
        },
        (Operand::Scalar(s), Operand::Quantity(q)) => match op {
            BinaryOp::Multiply => Outcome::Quantity(q.checked_mul(s)?),
            _ => return Err(unsupported(op, &left, &right)),
        },
        (Operand::Scalar(l), Operand::Scalar(r)) => scalars(op, l, r)?,
    };

    match (outcome, rule) {
        (Outcome::Quantity(q), ResultUnit::Unit(unit)) => Ok(Outcome::Quantity(q.to_unit(unit)?)),
        _ => Ok(outcome),
    }
}

fn quantities(op: BinaryOp, left: &Quantity, right: &Quantity) -> Result<Outcome> {
    match op {
        BinaryOp::Add => Ok(Outcome::Quantity(left.checked_add(right)?)),
        BinaryOp::Subtract => Ok(Outcome::Quantity(left.checked_sub(right)?)),
        BinaryOp::Divide => Ok(Outcome::Ratio(left.ratio_to(right)?)),
        BinaryOp::Multiply => Err(MeasureError::UnsupportedOperation(format!(
            "cannot multiply {} by {}: derived units are not supported",
            left.family(),
            right.family()
        ))),
        // Quantities of different families are simply not equal
        BinaryOp::Eq | BinaryOp::Ne if left.family() != right.family() => Ok(Outcome::Bool(op == BinaryOp::Ne)),
        _ => {
            let ordering = left
                .compare(right)
                .ok_or_else(|| MeasureError::mismatch(left.family(), right.family(), op.verb()))?;
            Ok(Outcome::Bool(op.test(ordering)))
        }
    }
}

fn scalars(op: BinaryOp, left: Decimal, right: Decimal) -> Result<Outcome> {
    let overflow = || MeasureError::Overflow("number");
    let value = match op {
        BinaryOp::Add => left.checked_add(right).ok_or_else(overflow)?,
        BinaryOp::Subtract => left.checked_sub(right).ok_or_else(overflow)?,
        BinaryOp::Multiply => left.checked_mul(right).ok_or_else(overflow)?,
        BinaryOp::Divide if right.is_zero() => return Err(MeasureError::DivisionByZero),
        BinaryOp::Divide => left.checked_div(right).ok_or_else(overflow)?,
        _ => return Ok(Outcome::Bool(op.test(left.cmp(&right)))),
    };
    Ok(Outcome::Scalar(value))
}

fn unsupported(op: BinaryOp, left: &Operand, right: &Operand) -> MeasureError {
    MeasureError::UnsupportedOperation(format!(
        "cannot {} {} and {} (`{}`)",
        op.verb(),
        left.describe(),
        right.describe(),
        op
    ))
}
