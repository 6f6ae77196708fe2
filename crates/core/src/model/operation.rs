use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown operation: {raw}")]
pub struct ParseOperationError {
    raw: String,
}

//
// ─── OPERATION ─────────────────────────────────────────────────────────────────
//

/// Arithmetic operation practiced in a session.
///
/// The operation decides both how a problem's answer is computed and the
/// symbol shown between operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Addition,
    Subtraction,
    Multiplication,
    Division,
}

impl Operation {
    pub const ALL: [Operation; 4] = [
        Operation::Addition,
        Operation::Subtraction,
        Operation::Multiplication,
        Operation::Division,
    ];

    /// Stable lowercase tag used for persistence and argument parsing.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Operation::Addition => "addition",
            Operation::Subtraction => "subtraction",
            Operation::Multiplication => "multiplication",
            Operation::Division => "division",
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Operation::Addition => "Addition",
            Operation::Subtraction => "Subtraction",
            Operation::Multiplication => "Multiplication",
            Operation::Division => "Division",
        }
    }

    #[must_use]
    pub fn symbol(self) -> &'static str {
        match self {
            Operation::Addition => "+",
            Operation::Subtraction => "−",
            Operation::Multiplication => "×",
            Operation::Division => "÷",
        }
    }

    /// Computes the answer for an operand sequence.
    ///
    /// - Addition: sum of all operands.
    /// - Subtraction: operands sorted descending, first minus the sum of the
    ///   rest, absolute value when that goes negative.
    /// - Multiplication: product of all operands.
    /// - Division: `operands[0]` floor-divided by each remaining operand in
    ///   order; a zero divisor turns that step's partial answer into 0.
    ///
    /// Returns `None` when the operand slice is empty or an intermediate value
    /// does not fit in `u64`.
    #[must_use]
    pub fn evaluate(self, operands: &[u64]) -> Option<u64> {
        let (&first, rest) = operands.split_first()?;
        match self {
            Operation::Addition => rest.iter().try_fold(first, |acc, &n| acc.checked_add(n)),
            Operation::Subtraction => {
                let mut sorted = operands.to_vec();
                sorted.sort_unstable_by(|a, b| b.cmp(a));
                let rest_sum = sorted[1..]
                    .iter()
                    .try_fold(0_u64, |acc, &n| acc.checked_add(n))?;
                Some(sorted[0].abs_diff(rest_sum))
            }
            Operation::Multiplication => {
                rest.iter().try_fold(first, |acc, &n| acc.checked_mul(n))
            }
            Operation::Division => Some(rest.iter().fold(first, |acc, &divisor| {
                if divisor == 0 { 0 } else { acc / divisor }
            })),
        }
    }

    /// Operand order as it should be shown to the learner.
    ///
    /// Subtraction problems are presented largest-first so the display matches
    /// how the answer is computed; every other operation keeps sampling order.
    #[must_use]
    pub fn display_order(self, mut operands: Vec<u64>) -> Vec<u64> {
        if self == Operation::Subtraction {
            operands.sort_unstable_by(|a, b| b.cmp(a));
        }
        operands
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Operation {
    type Err = ParseOperationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "addition" | "add" | "+" => Ok(Operation::Addition),
            "subtraction" | "sub" | "-" | "−" => Ok(Operation::Subtraction),
            "multiplication" | "mul" | "*" | "x" | "×" => Ok(Operation::Multiplication),
            "division" | "div" | "/" | "÷" => Ok(Operation::Division),
            _ => Err(ParseOperationError { raw: s.to_string() }),
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
