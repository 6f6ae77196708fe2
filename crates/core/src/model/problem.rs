use serde::{Deserialize, Serialize};

use crate::generator::GeneratorError;
use crate::model::Operation;

/// A single arithmetic problem with its precomputed answer.
///
/// Immutable once built: operands are stored in display order and the answer
/// is computed with the operation's answer policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Problem {
    operation: Operation,
    operands: Vec<u64>,
    answer: u64,
}

impl Problem {
    /// Build a problem from explicit operands.
    ///
    /// # Errors
    ///
    /// Returns `GeneratorError::InvalidParameter` if fewer than two operands
    /// are given or the answer cannot be represented.
    pub fn new(operation: Operation, operands: Vec<u64>) -> Result<Self, GeneratorError> {
        if operands.len() < 2 {
            return Err(GeneratorError::invalid(
                "operand_count",
                format!("must be at least 2, got {}", operands.len()),
            ));
        }
        let operands = operation.display_order(operands);
        let answer = operation.evaluate(&operands).ok_or_else(|| {
            GeneratorError::invalid("operands", "answer does not fit in u64")
        })?;

        Ok(Self {
            operation,
            operands,
            answer,
        })
    }

    #[must_use]
    pub fn operation(&self) -> Operation {
        self.operation
    }

    #[must_use]
    pub fn operands(&self) -> &[u64] {
        &self.operands
    }

    #[must_use]
    pub fn answer(&self) -> u64 {
        self.answer
    }

    /// Returns true if the learner's entry equals the answer.
    #[must_use]
    pub fn check(&self, entry: i128) -> bool {
        u64::try_from(entry).is_ok_and(|value| value == self.answer)
    }

    /// Human-readable prompt, e.g. `"48 + 17 = ?"`.
    #[must_use]
    pub fn prompt(&self) -> String {
        let symbol = format!(" {} ", self.operation.symbol());
        let joined = self
            .operands
            .iter()
            .map(u64::to_string)
            .collect::<Vec<_>>()
            .join(&symbol);
        format!("{joined} = ?")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subtraction_operands_are_stored_largest_first() {
        let problem = Problem::new(Operation::Subtraction, vec![12, 85, 30]).unwrap();
        assert_eq!(problem.operands(), &[85, 30, 12]);
        assert_eq!(problem.answer(), 43);
    }

    #[test]
    fn division_by_sampled_zero_is_zero() {
        let problem = Problem::new(Operation::Division, vec![50, 0]).unwrap();
        assert_eq!(problem.answer(), 0);
        assert!(problem.check(0));
    }

    #[test]
    fn negative_entries_never_match() {
        let problem = Problem::new(Operation::Subtraction, vec![3, 3]).unwrap();
        assert!(problem.check(0));
        assert!(!problem.check(-1));
    }

    #[test]
    fn needs_two_operands() {
        let err = Problem::new(Operation::Addition, vec![4]).unwrap_err();
        assert!(matches!(
            err,
            GeneratorError::InvalidParameter { name: "operand_count", .. }
        ));
    }

    #[test]
    fn prompt_uses_operation_symbol() {
        let problem = Problem::new(Operation::Multiplication, vec![6, 7]).unwrap();
        assert_eq!(problem.prompt(), "6 × 7 = ?");
    }
}
