//! Literal and line parser using pest

mod ast;

pub use ast::{Line, Term};

use pest::Parser;
use pest_derive::Parser;

use crate::error::{MeasureError, Result};
use crate::types::Literal;

#[derive(Parser)]
#[grammar = "parser/grammar.pest"]
pub struct MeasrParser;

fn parse_error(input: &str, err: pest::error::Error<Rule>) -> MeasureError {
    MeasureError::InvalidLiteral {
        input: input.to_string(),
        reason: err.variant.message().to_string(),
    }
}

/// Tokenize a single quantity literal: `#92-5/8in`, `2.54 m`, `-3/8in`
pub fn parse_literal(input: &str) -> Result<Literal> {
    let trimmed = input.trim();
    let mut pairs = MeasrParser::parse(Rule::literal, trimmed).map_err(|e| parse_error(trimmed, e))?;
    let quantity = pairs
        .next()
        .and_then(|line| line.into_inner().find(|p| p.as_rule() == Rule::quantity))
        .ok_or_else(|| MeasureError::InvalidLiteral {
            input: trimmed.to_string(),
            reason: "expected a quantity".to_string(),
        })?;
    ast::build_literal(quantity)
}

/// Parse a line: `term [op term] [to suffix]`
pub fn parse_line(input: &str) -> Result<Line> {
    let trimmed = input.trim();
    let pairs = MeasrParser::parse(Rule::line, trimmed).map_err(|e| parse_error(trimmed, e))?;
    ast::build_line(pairs)
}
