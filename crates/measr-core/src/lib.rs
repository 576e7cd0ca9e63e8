//! measr-core: exact arithmetic on physical quantities
//!
//! Quantities keep two storage shapes behind one type. SI values are
//! decimals (`amount / 10^scale` metres, grams, litres or bytes). US customary
//! values are integer multiples of `1/725760` of a yard, ounce or quart, so
//! every common fraction is exact. Temperatures are stored in 1/900 kelvin.
//! Arithmetic inside a system never rounds; only cross-system conversion
//! does, and it says so.
//!
//! # Example
//!
//! ```
//! use measr_core::{Engine, Quantity};
//!
//! let third: Quantity = "1/3cup".parse().unwrap();
//! let cup = third.checked_add(&third).unwrap().checked_add(&third).unwrap();
//! assert_eq!(cup, "1cup".parse::<Quantity>().unwrap());
//!
//! let inch: Quantity = "1in".parse().unwrap();
//! assert_eq!(inch, "25.4mm".parse::<Quantity>().unwrap());
//! assert_eq!(inch.to("mm").unwrap().to_string(), "25.4mm");
//!
//! let mut engine = Engine::new();
//! let result = engine.eval("92-5/8in * 9").unwrap();
//! assert_eq!(result.outcome.to_string(), "833-5/8in");
//! ```

pub mod arith;
pub mod convert;
pub mod error;
pub mod eval;
pub mod format;
pub mod parser;
pub mod types;

pub use arith::{apply, BinaryOp, Operand, Outcome, ResultUnit};
pub use convert::{Conversion, PrecisionLoss};
pub use error::{MeasureError, Result};
pub use eval::{eval_str, Evaluation};
pub use format::{FormatOptions, Fraction, Inspection, QuantityDict};
pub use parser::{parse_line, parse_literal};
pub use types::{Family, Literal, Quantity, Ratio, System, Unit, UnitDef, HCN, UNITS};

/// Evaluates lines and keeps their results
#[derive(Debug, Default)]
pub struct Engine {
    lines: Vec<LineResult>,
}

/// Result of evaluating a single line
#[derive(Debug, Clone)]
pub struct LineResult {
    pub input: String,
    pub result: Result<Evaluation>,
}

impl Engine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Evaluate a line and store the result
    pub fn eval(&mut self, input: &str) -> Result<Evaluation> {
        let result = eval_str(input);
        if let Err(err) = &result {
            tracing::debug!(input, error = %err, "line failed");
        }
        self.lines.push(LineResult {
            input: input.to_string(),
            result: result.clone(),
        });
        result
    }

    pub fn lines(&self) -> &[LineResult] {
        &self.lines
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Sum of every quantity result so far, in the first quantity's unit.
    ///
    /// `Ok(None)` when no line produced a quantity.
    pub fn total(&self) -> Result<Option<Quantity>> {
        let mut quantities = self.lines.iter().filter_map(|line| match &line.result {
            Ok(Evaluation {
                outcome: Outcome::Quantity(q),
                ..
            }) => Some(*q),
            _ => None,
        });
        let Some(first) = quantities.next() else {
            return Ok(None);
        };
        quantities
            .try_fold(first, |sum, q| sum.checked_add(&q))
            .map(Some)
    }
}
