//! Error types for the measurement engine
//!
//! Every expected failure is a value returned to the caller. Nothing in
//! this crate panics on user input.

use thiserror::Error;

use crate::types::Family;

/// Result alias used throughout the crate
pub type Result<T, E = MeasureError> = std::result::Result<T, E>;

/// Errors produced while constructing, combining or converting quantities
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MeasureError {
    /// Arithmetic or conversion between two different families (mass + length)
    #[error("cannot {operation} {left} and {right}")]
    FamilyMismatch {
        left: Family,
        right: Family,
        operation: &'static str,
    },

    /// The registry has no unit with this suffix
    #[error("unknown unit suffix `{suffix}`{}", suggestion_hint(.suggestion))]
    UnknownUnitSuffix {
        suffix: String,
        suggestion: Option<&'static str>,
    },

    /// A fraction was given for a unit that does not accept one, or it was malformed
    #[error("invalid fraction: {0}")]
    InvalidFractionSyntax(String),

    /// The `i64` amount (or the supported scale) was exceeded
    #[error("arithmetic overflow: {0}")]
    Overflow(&'static str),

    /// Division of a quantity by zero
    #[error("division by zero")]
    DivisionByZero,

    /// An operation that has no meaning for quantities (length * length, 2 + 3m)
    #[error("unsupported operation: {0}")]
    UnsupportedOperation(String),

    /// Text that is not a literal or line the parser understands
    #[error("cannot parse `{input}`: {reason}")]
    InvalidLiteral { input: String, reason: String },
}

fn suggestion_hint(suggestion: &Option<&'static str>) -> String {
    match suggestion {
        Some(s) => format!(" (did you mean `{s}`?)"),
        None => String::new(),
    }
}

impl MeasureError {
    pub(crate) fn mismatch(left: Family, right: Family, operation: &'static str) -> Self {
        Self::FamilyMismatch {
            left,
            right,
            operation,
        }
    }
}
