//! Line evaluator for front ends

use crate::arith::{apply, Operand, Outcome, ResultUnit};
use crate::convert::PrecisionLoss;
use crate::error::{MeasureError, Result};
use crate::parser::{parse_line, Line, Term};
use crate::types::{Quantity, Unit};

/// Result of evaluating one line
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Evaluation {
    pub outcome: Outcome,
    /// Set when a `to` conversion rounded across systems
    pub loss: Option<PrecisionLoss>,
}

impl From<Outcome> for Evaluation {
    fn from(outcome: Outcome) -> Self {
        Self { outcome, loss: None }
    }
}

fn operand(term: &Term) -> Result<Operand> {
    match term {
        Term::Quantity(literal) => Ok(Operand::Quantity(Quantity::from_literal(literal)?)),
        Term::Scalar(value) => Ok(Operand::Scalar(*value)),
    }
}

pub fn evaluate(line: &Line) -> Result<Evaluation> {
    let target = line.target.as_deref().map(Unit::lookup).transpose()?;
    let left = operand(&line.left)?;

    let Some((op, right)) = &line.operation else {
        return match (left, target) {
            (Operand::Quantity(q), Some(unit)) => {
                let conversion = q.convert_to_unit(unit)?;
                Ok(Evaluation {
                    outcome: Outcome::Quantity(conversion.quantity),
                    loss: conversion.loss,
                })
            }
            (Operand::Quantity(q), None) => Ok(Outcome::Quantity(q).into()),
            // `5 to cm` attaches the unit
            (Operand::Scalar(value), Some(unit)) => Ok(Outcome::Quantity(Quantity::from_value(value, unit)?).into()),
            (Operand::Scalar(value), None) => Ok(Outcome::Scalar(value).into()),
        };
    };

    let rule = target.map_or(ResultUnit::Left, ResultUnit::Unit);
    let outcome = apply(*op, left, operand(right)?, rule)?;
    match (outcome, target) {
        (Outcome::Quantity(_), _) | (_, None) => Ok(outcome.into()),
        (_, Some(unit)) => Err(MeasureError::UnsupportedOperation(format!(
            "`{op}` does not produce a quantity that can be converted to {unit}"
        ))),
    }
}

/// Parse and evaluate a line
pub fn eval_str(input: &str) -> Result<Evaluation> {
    evaluate(&parse_line(input)?)
}
