//! Random problem generation.
//!
//! Every generator draws operands through an `OperandSampler`, so callers can
//! swap the thread RNG for a seeded or scripted source.

use rand::rngs::{StdRng, ThreadRng};
use rand::{Rng, SeedableRng};
use thiserror::Error;

use crate::model::{AggregationGrid, CrossTable, DigitRange, Operation, Problem};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum GeneratorError {
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

impl GeneratorError {
    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}

//
// ─── SAMPLERS ──────────────────────────────────────────────────────────────────
//

/// Source of operand values.
pub trait OperandSampler {
    /// Draw one value for an operand in `range`.
    fn sample(&mut self, range: DigitRange) -> u64;
}

/// Uniform sampler backed by a `rand` RNG.
#[derive(Debug, Clone)]
pub struct RandomSampler<R = ThreadRng> {
    rng: R,
}

impl RandomSampler<ThreadRng> {
    #[must_use]
    pub fn thread() -> Self {
        Self { rng: rand::rng() }
    }
}

impl RandomSampler<StdRng> {
    /// Deterministic sampler, useful for replaying a session.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl<R: Rng> RandomSampler<R> {
    #[must_use]
    pub fn from_rng(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: Rng> OperandSampler for RandomSampler<R> {
    fn sample(&mut self, range: DigitRange) -> u64 {
        self.rng.random_range(range.min()..=range.max())
    }
}

/// Replays a fixed list of values in order, cycling when exhausted.
///
/// The digit range is ignored, so scripted values may fall outside it.
#[derive(Debug, Clone)]
pub struct ScriptedSampler {
    values: Vec<u64>,
    next: usize,
}

impl ScriptedSampler {
    #[must_use]
    pub fn new(values: impl Into<Vec<u64>>) -> Self {
        Self {
            values: values.into(),
            next: 0,
        }
    }
}

impl OperandSampler for ScriptedSampler {
    fn sample(&mut self, _range: DigitRange) -> u64 {
        if self.values.is_empty() {
            return 0;
        }
        let value = self.values[self.next % self.values.len()];
        self.next = self.next.wrapping_add(1);
        value
    }
}

//
// ─── GENERATORS ────────────────────────────────────────────────────────────────
//

/// Checks that `count` operands drawn from `range` always give an answer that
/// fits in `u64`.
fn ensure_representable(
    operation: Operation,
    range: DigitRange,
    count: usize,
) -> Result<(), GeneratorError> {
    // Add, multiply and the subtrahend sum all peak when every operand is max.
    let worst = vec![range.max(); count];
    match operation.evaluate(&worst) {
        Some(_) => Ok(()),
        None => Err(GeneratorError::invalid(
            "digit_count",
            format!(
                "{count} operands of {} digits overflow for {}",
                range.digits(),
                operation.as_str()
            ),
        )),
    }
}

/// Generate `batch_size` problems of `operand_count` operands each.
///
/// A batch size of 0 returns an empty list.
///
/// # Errors
///
/// Returns `GeneratorError::InvalidParameter` if `digit_count` is out of range,
/// `operand_count < 2`, or answers could overflow.
pub fn generate<S: OperandSampler + ?Sized>(
    operation: Operation,
    digit_count: u32,
    operand_count: usize,
    batch_size: usize,
    sampler: &mut S,
) -> Result<Vec<Problem>, GeneratorError> {
    let range = DigitRange::new(digit_count)?;
    if operand_count < 2 {
        return Err(GeneratorError::invalid(
            "operand_count",
            format!("must be at least 2, got {operand_count}"),
        ));
    }
    ensure_representable(operation, range, operand_count)?;

    (0..batch_size)
        .map(|_| {
            let operands = (0..operand_count).map(|_| sampler.sample(range)).collect();
            Problem::new(operation, operands)
        })
        .collect()
}

/// Generate a cross table with `header_count` row and column headers.
///
/// # Errors
///
/// Returns `GeneratorError::InvalidParameter` if `digit_count` is out of range,
/// `header_count` is 0, or cell answers could overflow.
pub fn generate_cross_table<S: OperandSampler + ?Sized>(
    operation: Operation,
    digit_count: u32,
    header_count: usize,
    sampler: &mut S,
) -> Result<CrossTable, GeneratorError> {
    let range = DigitRange::new(digit_count)?;
    if header_count == 0 {
        return Err(GeneratorError::invalid("header_count", "must be at least 1"));
    }
    ensure_representable(operation, range, 2)?;

    let mut cols = Vec::with_capacity(header_count);
    let mut rows = Vec::with_capacity(header_count);
    for _ in 0..header_count {
        cols.push(sampler.sample(range));
        rows.push(sampler.sample(range));
    }
    CrossTable::new(operation, rows, cols)
}

/// Generate a `dimension` × `dimension` aggregation grid.
///
/// # Errors
///
/// Returns `GeneratorError::InvalidParameter` if `dimension` is 0 or
/// `digit_count` is out of range.
pub fn generate_aggregation_grid<S: OperandSampler + ?Sized>(
    dimension: usize,
    digit_count: u32,
    sampler: &mut S,
) -> Result<AggregationGrid, GeneratorError> {
    let range = DigitRange::new(digit_count)?;
    if dimension == 0 {
        return Err(GeneratorError::invalid("dimension", "must be at least 1"));
    }

    let rows = (0..dimension)
        .map(|_| (0..dimension).map(|_| sampler.sample(range)).collect())
        .collect();
    AggregationGrid::from_rows(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_batch_is_empty_not_an_error() {
        let problems =
            generate(Operation::Addition, 2, 2, 0, &mut RandomSampler::seeded(1)).unwrap();
        assert!(problems.is_empty());
    }

    #[test]
    fn division_with_sampled_zero_divisor() {
        let mut sampler = ScriptedSampler::new([50, 0]);
        let problems = generate(Operation::Division, 2, 2, 1, &mut sampler).unwrap();
        assert_eq!(problems.len(), 1);
        assert_eq!(problems[0].operands(), &[50, 0]);
        assert_eq!(problems[0].answer(), 0);
    }

    #[test]
    fn rejects_single_operand() {
        let err = generate(Operation::Addition, 2, 1, 5, &mut RandomSampler::seeded(1))
            .unwrap_err();
        assert!(matches!(
            err,
            GeneratorError::InvalidParameter { name: "operand_count", .. }
        ));
    }

    #[test]
    fn rejects_overflowing_multiplication() {
        let err = generate(Operation::Multiplication, 10, 3, 1, &mut RandomSampler::seeded(1))
            .unwrap_err();
        assert!(matches!(
            err,
            GeneratorError::InvalidParameter { name: "digit_count", .. }
        ));
    }

    #[test]
    fn answers_above_i64_can_still_be_entered() {
        // 9^20 fits in u64 but not in i64.
        let problems =
            generate(Operation::Multiplication, 1, 20, 1, &mut ScriptedSampler::new([9])).unwrap();
        let answer = problems[0].answer();
        assert_eq!(answer, 12_157_665_459_056_928_801);

        let entry = crate::model::parse_entry(&answer.to_string()).unwrap().unwrap();
        assert!(problems[0].check(entry));
    }

    #[test]
    fn seeded_samplers_replay_identically() {
        let a = generate(Operation::Subtraction, 3, 3, 10, &mut RandomSampler::seeded(7)).unwrap();
        let b = generate(Operation::Subtraction, 3, 3, 10, &mut RandomSampler::seeded(7)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn cross_table_draws_independent_headers() {
        let mut sampler = ScriptedSampler::new([5, 7]);
        let table = generate_cross_table(Operation::Addition, 1, 1, &mut sampler).unwrap();
        assert_eq!(table.col_headers(), &[5]);
        assert_eq!(table.row_headers(), &[7]);
        assert_eq!(table.cell_answer(0, 0), Some(12));
    }

    #[test]
    fn aggregation_grid_is_square_and_in_range() {
        let grid = generate_aggregation_grid(5, 2, &mut RandomSampler::seeded(3)).unwrap();
        assert_eq!(grid.dimension(), 5);
        assert!(grid.rows().iter().flatten().all(|&v| (10..=99).contains(&v)));
    }

    #[test]
    fn scripted_sampler_cycles() {
        let range = DigitRange::new(1).unwrap();
        let mut sampler = ScriptedSampler::new([1, 2]);
        let drawn: Vec<_> = (0..5).map(|_| sampler.sample(range)).collect();
        assert_eq!(drawn, vec![1, 2, 1, 2, 1]);
    }
}
