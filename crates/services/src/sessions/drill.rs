use chrono::{DateTime, Utc};
use mastery_core::generator::{OperandSampler, generate};
use mastery_core::model::{
    AnswerMap, GridCoordinate, Operation, PracticeSettings, Problem, SessionKind, SessionResult,
    SessionResultId,
};
use mastery_core::scorer::{CellStatus, ExpectedValues, ScoreError, ScoreState, full_recheck};

use crate::error::SessionError;

/// A generated batch laid out as a single column: problem `i` is `Cell { row: i, col: 0 }`.
struct Batch<'a>(&'a [Problem]);

fn coordinate(index: usize) -> GridCoordinate {
    GridCoordinate::Cell { row: index, col: 0 }
}

impl ExpectedValues for Batch<'_> {
    fn coordinates(&self) -> Vec<GridCoordinate> {
        (0..self.0.len()).map(coordinate).collect()
    }

    fn contains(&self, coord: GridCoordinate) -> bool {
        matches!(coord, GridCoordinate::Cell { row, col: 0 } if row < self.0.len())
    }

    fn expected(&self, coord: GridCoordinate) -> Result<u64, ScoreError> {
        match coord {
            GridCoordinate::Cell { row, col: 0 } => self
                .0
                .get(row)
                .map(Problem::answer)
                .ok_or(ScoreError::UnknownCoordinate(coord)),
            _ => Err(ScoreError::UnknownCoordinate(coord)),
        }
    }
}

/// Batch mode: a list of independent operand problems graded together.
pub struct DrillSession<S> {
    operation: Operation,
    settings: PracticeSettings,
    sampler: S,
    problems: Vec<Problem>,
    answers: AnswerMap,
    score: ScoreState,
}

impl<S: OperandSampler> DrillSession<S> {
    /// # Errors
    ///
    /// Returns `SessionError::Generator` if the settings cannot produce problems.
    pub fn new(
        operation: Operation,
        settings: PracticeSettings,
        mut sampler: S,
    ) -> Result<Self, SessionError> {
        let problems = Self::draw(operation, &settings, &mut sampler)?;
        tracing::debug!(
            operation = operation.as_str(),
            problems = problems.len(),
            "started drill"
        );
        Ok(Self {
            operation,
            settings,
            sampler,
            problems,
            answers: AnswerMap::new(),
            score: ScoreState::empty(),
        })
    }

    fn draw(
        operation: Operation,
        settings: &PracticeSettings,
        sampler: &mut S,
    ) -> Result<Vec<Problem>, SessionError> {
        Ok(generate(
            operation,
            settings.digit_count(),
            settings.operand_count(),
            settings.batch_size(),
            sampler,
        )?)
    }

    #[must_use]
    pub fn operation(&self) -> Operation {
        self.operation
    }

    #[must_use]
    pub fn problems(&self) -> &[Problem] {
        &self.problems
    }

    #[must_use]
    pub fn score(&self) -> &ScoreState {
        &self.score
    }

    #[must_use]
    pub fn answer_for(&self, index: usize) -> Option<i128> {
        self.answers.get(coordinate(index))
    }

    /// Record raw learner input for problem `index`. Blank input clears it.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::ProblemOutOfRange` for a bad index, or
    /// `SessionError::Entry` if the text is not an integer.
    pub fn answer(&mut self, index: usize, raw: &str) -> Result<Option<i128>, SessionError> {
        if index >= self.problems.len() {
            return Err(SessionError::ProblemOutOfRange {
                index,
                len: self.problems.len(),
            });
        }
        Ok(self.answers.enter(coordinate(index), raw)?)
    }

    /// Grade every answered problem.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Score` if grading hits a key outside the batch.
    pub fn score_all(&mut self) -> Result<&ScoreState, SessionError> {
        self.score = full_recheck(&Batch(&self.problems), &self.answers)?;
        Ok(&self.score)
    }

    #[must_use]
    pub fn status(&self, index: usize) -> CellStatus {
        self.score.status(coordinate(index))
    }

    /// Draw a new batch; answers and score are wiped.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Generator` if problems cannot be generated.
    pub fn refresh(&mut self) -> Result<(), SessionError> {
        self.problems = Self::draw(self.operation, &self.settings, &mut self.sampler)?;
        self.answers.clear();
        self.score = ScoreState::empty();
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `SessionError::Result` if the score cannot be represented.
    pub fn to_result(
        &self,
        elapsed_secs: u64,
        created_at: DateTime<Utc>,
    ) -> Result<SessionResult, SessionError> {
        Ok(SessionResult::new(
            SessionResultId::generate(),
            SessionKind::Practice(self.operation),
            self.settings.digit_count(),
            &self.score,
            elapsed_secs,
            created_at,
        )?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mastery_core::generator::ScriptedSampler;
    use mastery_core::time::fixed_now;

    fn division_drill(values: Vec<u64>, batch: usize) -> DrillSession<ScriptedSampler> {
        let settings = PracticeSettings::new(2, 2, batch).unwrap();
        DrillSession::new(Operation::Division, settings, ScriptedSampler::new(values)).unwrap()
    }

    #[test]
    fn zero_divisor_problem_expects_zero() {
        let mut drill = division_drill(vec![50, 0], 1);
        assert_eq!(drill.problems()[0].answer(), 0);

        drill.answer(0, "0").unwrap();
        assert_eq!(drill.score_all().unwrap().accuracy(), 100);
    }

    #[test]
    fn scores_only_answered_problems() {
        // 84 / 12 = 7, 90 / 10 = 9, 40 / 20 = 2
        let mut drill = division_drill(vec![84, 12, 90, 10, 40, 20], 3);
        drill.answer(0, "7").unwrap();
        drill.answer(1, "8").unwrap();

        let score = drill.score_all().unwrap();
        assert_eq!(score.checked_count(), 2);
        assert_eq!(score.correct_count(), 1);
        assert_eq!(drill.status(1), CellStatus::Incorrect);
        assert_eq!(drill.status(2), CellStatus::Unchecked);
    }

    #[test]
    fn accepts_answers_wider_than_i64() {
        let settings = PracticeSettings::new(18, 10, 1).unwrap();
        let max = 999_999_999_999_999_999_u64;
        let mut drill =
            DrillSession::new(Operation::Addition, settings, ScriptedSampler::new(vec![max])).unwrap();
        let expected = drill.problems()[0].answer();
        assert_eq!(expected, max * 10);

        drill.answer(0, &expected.to_string()).unwrap();
        assert_eq!(drill.score_all().unwrap().correct_count(), 1);
        assert_eq!(drill.status(0), CellStatus::Correct);
    }

    #[test]
    fn out_of_range_index_is_rejected() {
        let mut drill = division_drill(vec![84, 12], 1);
        assert!(matches!(
            drill.answer(3, "1"),
            Err(SessionError::ProblemOutOfRange { index: 3, len: 1 })
        ));
    }

    #[test]
    fn empty_batch_scores_zero() {
        let mut drill = division_drill(vec![84, 12], 0);
        assert!(drill.problems().is_empty());
        assert_eq!(drill.score_all().unwrap().accuracy(), 0);
        let result = drill.to_result(0, fixed_now()).unwrap();
        assert_eq!(result.total_problems(), 0);
    }

    #[test]
    fn refresh_draws_a_new_batch() {
        let mut drill = division_drill(vec![84, 12, 90, 10], 1);
        drill.answer(0, "7").unwrap();
        drill.score_all().unwrap();
        drill.refresh().unwrap();

        assert_eq!(drill.problems()[0].operands(), &[90, 10]);
        assert_eq!(drill.answer_for(0), None);
        assert!(drill.score().is_empty());
    }
}
