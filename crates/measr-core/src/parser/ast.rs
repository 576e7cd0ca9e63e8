//! Syntax tree for measr lines

use pest::iterators::{Pair, Pairs};
use rust_decimal::Decimal;
use std::str::FromStr;

use super::Rule;
use crate::arith::BinaryOp;
use crate::error::{MeasureError, Result};
use crate::types::Literal;

/// One operand of a line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Term {
    Quantity(Literal),
    Scalar(Decimal),
}

/// A parsed line: `left [op right] [to target]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub left: Term,
    pub operation: Option<(BinaryOp, Term)>,
    pub target: Option<String>,
}

fn invalid(input: &str, reason: impl Into<String>) -> MeasureError {
    MeasureError::InvalidLiteral {
        input: input.to_string(),
        reason: reason.into(),
    }
}

fn parse_decimal(s: &str) -> Result<Decimal> {
    Decimal::from_str(s).map_err(|e| invalid(s, e.to_string()))
}

fn parse_integer(s: &str) -> Result<u64> {
    s.parse().map_err(|_| invalid(s, "number too large"))
}

/// Build a line from the pairs of `Rule::line`
pub fn build_line(pairs: Pairs<'_, Rule>) -> Result<Line> {
    let mut terms = Vec::new();
    let mut op = None;
    let mut target = None;

    for pair in pairs.flatten() {
        match pair.as_rule() {
            Rule::quantity => terms.push(Term::Quantity(build_literal(pair)?)),
            Rule::scalar => terms.push(Term::Scalar(parse_decimal(pair.as_str())?)),
            Rule::bin_op => op = Some(build_op(pair.as_str())?),
            Rule::target => {
                target = pair
                    .into_inner()
                    .find(|p| p.as_rule() == Rule::suffix)
                    .map(|p| p.as_str().to_string());
            }
            _ => {}
        }
    }

    let mut terms = terms.into_iter();
    let left = terms.next().ok_or_else(|| invalid("", "empty expression"))?;
    let operation = match (op, terms.next()) {
        (Some(op), Some(right)) => Some((op, right)),
        (None, None) => None,
        _ => return Err(invalid("", "incomplete expression")),
    };
    Ok(Line {
        left,
        operation,
        target,
    })
}

fn build_op(symbol: &str) -> Result<BinaryOp> {
    Ok(match symbol {
        "+" => BinaryOp::Add,
        "-" => BinaryOp::Subtract,
        "*" => BinaryOp::Multiply,
        "/" => BinaryOp::Divide,
        "==" => BinaryOp::Eq,
        "!=" => BinaryOp::Ne,
        "<" => BinaryOp::Lt,
        "<=" => BinaryOp::Le,
        ">" => BinaryOp::Gt,
        ">=" => BinaryOp::Ge,
        other => return Err(invalid(other, "unknown operator")),
    })
}

/// Build a literal from a `Rule::quantity` pair
pub fn build_literal(pair: Pair<'_, Rule>) -> Result<Literal> {
    let source = pair.as_str();
    let mut literal = Literal::new(Decimal::ZERO, "");

    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::sign => literal.negative = true,
            Rule::number => literal.whole = parse_decimal(inner.as_str())?,
            Rule::fraction => literal.fraction = Some(build_fraction(inner)?),
            Rule::mixed => {
                for part in inner.into_inner() {
                    match part.as_rule() {
                        Rule::number => literal.whole = parse_decimal(part.as_str())?,
                        Rule::fraction => literal.fraction = Some(build_fraction(part)?),
                        _ => {}
                    }
                }
            }
            Rule::suffix => literal.suffix = inner.as_str().to_string(),
            _ => {}
        }
    }

    if literal.suffix.is_empty() {
        return Err(invalid(source, "missing unit suffix"));
    }
    Ok(literal)
}

fn build_fraction(pair: Pair<'_, Rule>) -> Result<(u64, u64)> {
    let source = pair.as_str();
    let mut parts = pair.into_inner().map(|p| parse_integer(p.as_str()));
    match (parts.next(), parts.next()) {
        (Some(num), Some(den)) => Ok((num?, den?)),
        _ => Err(MeasureError::InvalidFractionSyntax(source.to_string())),
    }
}
