//! Grading of learner entries against a grid's expected values.
//!
//! A `ScoreState` is always rebuilt from the full checked/incorrect sets, so
//! counts and accuracy can never drift from the cells they describe.

use std::collections::BTreeSet;
use thiserror::Error;

use crate::model::{AggregationGrid, AnswerMap, CrossTable, GridCoordinate};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ScoreError {
    #[error("coordinate {0} is not part of this grid")]
    UnknownCoordinate(GridCoordinate),

    #[error("expected value for {0} does not fit in u64")]
    Unrepresentable(GridCoordinate),
}

/// Rounded percentage of `correct` over `checked`; 0 when nothing is checked.
#[must_use]
pub fn accuracy_percent(correct: usize, checked: usize) -> u8 {
    if checked == 0 {
        return 0;
    }
    let correct = correct.min(checked) as u128;
    let checked = checked as u128;
    // round-half-up of 100 * correct / checked
    let pct = (200 * correct + checked) / (2 * checked);
    u8::try_from(pct).unwrap_or(100)
}

//
// ─── EXPECTED VALUES ───────────────────────────────────────────────────────────
//

/// A grid that knows its answerable keys and the correct value for each.
pub trait ExpectedValues {
    /// Every answerable coordinate, in display order.
    fn coordinates(&self) -> Vec<GridCoordinate>;

    /// Returns true if `coord` belongs to this grid.
    fn contains(&self, coord: GridCoordinate) -> bool;

    /// Correct value for `coord`.
    ///
    /// # Errors
    ///
    /// Returns `ScoreError::UnknownCoordinate` if `coord` is not part of the grid.
    fn expected(&self, coord: GridCoordinate) -> Result<u64, ScoreError>;
}

impl ExpectedValues for AggregationGrid {
    fn coordinates(&self) -> Vec<GridCoordinate> {
        self.targets().collect()
    }

    fn contains(&self, coord: GridCoordinate) -> bool {
        let n = self.dimension();
        match coord {
            GridCoordinate::RowSum(i) | GridCoordinate::ColSum(i) => i < n,
            GridCoordinate::GrandTotal => true,
            GridCoordinate::Cell { .. } => false,
        }
    }

    fn expected(&self, coord: GridCoordinate) -> Result<u64, ScoreError> {
        let value = match coord {
            GridCoordinate::RowSum(i) => self.row_sum(i),
            GridCoordinate::ColSum(j) => self.col_sum(j),
            GridCoordinate::GrandTotal => Some(self.grand_total()),
            GridCoordinate::Cell { .. } => None,
        };
        value.ok_or(ScoreError::UnknownCoordinate(coord))
    }
}

impl ExpectedValues for CrossTable {
    fn coordinates(&self) -> Vec<GridCoordinate> {
        self.cells().collect()
    }

    fn contains(&self, coord: GridCoordinate) -> bool {
        matches!(
            coord,
            GridCoordinate::Cell { row, col }
                if row < self.row_headers().len() && col < self.col_headers().len()
        )
    }

    fn expected(&self, coord: GridCoordinate) -> Result<u64, ScoreError> {
        let GridCoordinate::Cell { row, col } = coord else {
            return Err(ScoreError::UnknownCoordinate(coord));
        };
        if !self.contains(coord) {
            return Err(ScoreError::UnknownCoordinate(coord));
        }
        self.cell_answer(row, col)
            .ok_or(ScoreError::Unrepresentable(coord))
    }
}

//
// ─── SCORE STATE ───────────────────────────────────────────────────────────────
//

/// Display status of a single cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellStatus {
    Unchecked,
    Correct,
    Incorrect,
}

/// Which cells have been graded and which of those were wrong.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScoreState {
    checked: BTreeSet<GridCoordinate>,
    incorrect: BTreeSet<GridCoordinate>,
}

impl ScoreState {
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a state from explicit sets.
    ///
    /// Incorrect coordinates are always counted as checked.
    pub fn from_sets(
        checked: impl IntoIterator<Item = GridCoordinate>,
        incorrect: impl IntoIterator<Item = GridCoordinate>,
    ) -> Self {
        let incorrect: BTreeSet<_> = incorrect.into_iter().collect();
        let mut checked: BTreeSet<_> = checked.into_iter().collect();
        checked.extend(incorrect.iter().copied());
        Self { checked, incorrect }
    }

    #[must_use]
    pub fn checked(&self) -> &BTreeSet<GridCoordinate> {
        &self.checked
    }

    #[must_use]
    pub fn incorrect(&self) -> &BTreeSet<GridCoordinate> {
        &self.incorrect
    }

    #[must_use]
    pub fn checked_count(&self) -> usize {
        self.checked.len()
    }

    #[must_use]
    pub fn incorrect_count(&self) -> usize {
        self.incorrect.len()
    }

    #[must_use]
    pub fn correct_count(&self) -> usize {
        self.checked.len() - self.incorrect.len()
    }

    #[must_use]
    pub fn accuracy(&self) -> u8 {
        accuracy_percent(self.correct_count(), self.checked_count())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.checked.is_empty()
    }

    #[must_use]
    pub fn status(&self, coord: GridCoordinate) -> CellStatus {
        if self.incorrect.contains(&coord) {
            CellStatus::Incorrect
        } else if self.checked.contains(&coord) {
            CellStatus::Correct
        } else {
            CellStatus::Unchecked
        }
    }
}

//
// ─── EVALUATION ────────────────────────────────────────────────────────────────
//

fn matches_expected(entry: i128, expected: u64) -> bool {
    u64::try_from(entry).is_ok_and(|value| value == expected)
}

fn ensure_known<G: ExpectedValues + ?Sized>(
    grid: &G,
    coord: GridCoordinate,
) -> Result<(), ScoreError> {
    if grid.contains(coord) {
        Ok(())
    } else {
        Err(ScoreError::UnknownCoordinate(coord))
    }
}

/// Grade every answered coordinate of `grid` from scratch.
///
/// Unanswered coordinates stay unchecked. Calling this twice with the same
/// answers yields the same state.
///
/// # Errors
///
/// Returns `ScoreError::UnknownCoordinate` if `answers` holds a key the grid
/// does not define.
pub fn full_recheck<G: ExpectedValues + ?Sized>(
    grid: &G,
    answers: &AnswerMap,
) -> Result<ScoreState, ScoreError> {
    for coord in answers.coordinates() {
        ensure_known(grid, coord)?;
    }

    let mut checked = BTreeSet::new();
    let mut incorrect = BTreeSet::new();
    for coord in grid.coordinates() {
        let Some(entry) = answers.get(coord) else {
            continue;
        };
        checked.insert(coord);
        if !matches_expected(entry, grid.expected(coord)?) {
            incorrect.insert(coord);
        }
    }

    Ok(ScoreState { checked, incorrect })
}

/// Grade a single coordinate and merge it into `previous`.
///
/// Other checked cells keep their status. An unanswered coordinate leaves the
/// state unchanged.
///
/// # Errors
///
/// Returns `ScoreError::UnknownCoordinate` if `coord` is not part of `grid`.
pub fn check_cell<G: ExpectedValues + ?Sized>(
    grid: &G,
    answers: &AnswerMap,
    previous: &ScoreState,
    coord: GridCoordinate,
) -> Result<ScoreState, ScoreError> {
    ensure_known(grid, coord)?;
    let Some(entry) = answers.get(coord) else {
        return Ok(previous.clone());
    };

    let mut next = previous.clone();
    next.checked.insert(coord);
    if matches_expected(entry, grid.expected(coord)?) {
        next.incorrect.remove(&coord);
    } else {
        next.incorrect.insert(coord);
    }
    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Operation;

    fn five_by_five() -> AggregationGrid {
        AggregationGrid::from_rows(vec![
            vec![12, 45, 33, 27, 81],
            vec![64, 19, 50, 72, 38],
            vec![91, 23, 44, 16, 57],
            vec![35, 68, 29, 83, 10],
            vec![47, 52, 76, 20, 99],
        ])
        .unwrap()
    }

    #[test]
    fn accuracy_rounds_half_up_and_handles_zero() {
        assert_eq!(accuracy_percent(0, 0), 0);
        assert_eq!(accuracy_percent(2, 3), 67);
        assert_eq!(accuracy_percent(1, 3), 33);
        assert_eq!(accuracy_percent(1, 8), 13);
        assert_eq!(accuracy_percent(5, 5), 100);
    }

    #[test]
    fn aggregation_scenario_scores_two_of_three() {
        let grid = five_by_five();
        let mut answers = AnswerMap::new();
        answers.set(GridCoordinate::RowSum(0), Some(198));
        answers.set(GridCoordinate::ColSum(0), Some(250));
        answers.set(GridCoordinate::GrandTotal, Some(1191));
        assert_eq!(grid.grand_total(), 1191);

        let score = full_recheck(&grid, &answers).unwrap();

        assert_eq!(
            score.checked().iter().copied().collect::<Vec<_>>(),
            vec![
                GridCoordinate::RowSum(0),
                GridCoordinate::ColSum(0),
                GridCoordinate::GrandTotal
            ]
        );
        assert_eq!(
            score.incorrect().iter().copied().collect::<Vec<_>>(),
            vec![GridCoordinate::ColSum(0)]
        );
        assert_eq!(score.correct_count(), 2);
        assert_eq!(score.accuracy(), 67);
    }

    #[test]
    fn full_recheck_is_idempotent() {
        let grid = five_by_five();
        let mut answers = AnswerMap::new();
        answers.set(GridCoordinate::RowSum(2), Some(231));
        answers.set(GridCoordinate::ColSum(4), Some(1));

        let first = full_recheck(&grid, &answers).unwrap();
        let second = full_recheck(&grid, &answers).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn full_recheck_drops_cells_that_were_cleared() {
        let grid = five_by_five();
        let mut answers = AnswerMap::new();
        answers.set(GridCoordinate::RowSum(0), Some(1));
        assert_eq!(full_recheck(&grid, &answers).unwrap().checked_count(), 1);

        answers.set(GridCoordinate::RowSum(0), None);
        let score = full_recheck(&grid, &answers).unwrap();
        assert!(score.is_empty());
        assert_eq!(score.accuracy(), 0);
    }

    #[test]
    fn full_recheck_rejects_foreign_keys() {
        let grid = five_by_five();
        let mut answers = AnswerMap::new();
        answers.set(GridCoordinate::RowSum(5), Some(1));
        let err = full_recheck(&grid, &answers).unwrap_err();
        assert_eq!(err, ScoreError::UnknownCoordinate(GridCoordinate::RowSum(5)));
    }

    #[test]
    fn cross_table_single_cell_check_then_recheck() {
        let table = CrossTable::new(Operation::Addition, vec![7, 4], vec![5, 9]).unwrap();
        let target = GridCoordinate::Cell { row: 0, col: 0 };
        let other = GridCoordinate::Cell { row: 1, col: 1 };
        let mut answers = AnswerMap::new();

        answers.set(other, Some(13));
        let score = check_cell(&table, &answers, &ScoreState::empty(), other).unwrap();

        answers.set(target, Some(12));
        let score = check_cell(&table, &answers, &score, target).unwrap();
        assert_eq!(score.status(target), CellStatus::Correct);
        assert_eq!(score.accuracy(), 100);

        answers.set(target, Some(11));
        let score = check_cell(&table, &answers, &score, target).unwrap();
        assert_eq!(score.status(target), CellStatus::Incorrect);
        assert_eq!(score.status(other), CellStatus::Correct);
        assert_eq!(score.checked_count(), 2);
        assert_eq!(score.accuracy(), 50);
    }

    #[test]
    fn unanswered_cell_check_is_a_no_op() {
        let table = CrossTable::new(Operation::Multiplication, vec![3], vec![4]).unwrap();
        let coord = GridCoordinate::Cell { row: 0, col: 0 };
        let before = ScoreState::empty();
        let after = check_cell(&table, &AnswerMap::new(), &before, coord).unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn check_cell_rejects_out_of_range_coordinates() {
        let table = CrossTable::new(Operation::Division, vec![8], vec![2]).unwrap();
        let err = check_cell(
            &table,
            &AnswerMap::new(),
            &ScoreState::empty(),
            GridCoordinate::GrandTotal,
        )
        .unwrap_err();
        assert_eq!(err, ScoreError::UnknownCoordinate(GridCoordinate::GrandTotal));
    }

    #[test]
    fn from_sets_counts_incorrect_as_checked() {
        let state = ScoreState::from_sets(std::iter::empty(), [GridCoordinate::GrandTotal]);
        assert_eq!(state.checked_count(), 1);
        assert_eq!(state.correct_count(), 0);
    }
}
