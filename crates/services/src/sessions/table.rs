use chrono::{DateTime, Utc};
use mastery_core::generator::{OperandSampler, generate_cross_table};
use mastery_core::model::{
    AnswerMap, CrossTable, GridCoordinate, Operation, PracticeSettings, SessionKind,
    SessionResult, SessionResultId,
};
use mastery_core::scorer::{CellStatus, ExpectedValues, ScoreError, ScoreState, check_cell};

use super::enter_checked;
use crate::error::SessionError;

/// Cross-table practice: every row header paired with every column header.
///
/// Cells are checked one at a time through the focused cell; other cells keep
/// their status.
pub struct PracticeTableSession<S> {
    operation: Operation,
    settings: PracticeSettings,
    sampler: S,
    table: CrossTable,
    answers: AnswerMap,
    score: ScoreState,
    focused: Option<GridCoordinate>,
}

impl<S: OperandSampler> PracticeTableSession<S> {
    /// Generate a fresh table for `operation`.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Generator` if the settings cannot produce a table.
    pub fn new(
        operation: Operation,
        settings: PracticeSettings,
        mut sampler: S,
    ) -> Result<Self, SessionError> {
        let table = generate_cross_table(
            operation,
            settings.digit_count(),
            settings.header_count(),
            &mut sampler,
        )?;
        tracing::debug!(
            operation = operation.as_str(),
            digits = settings.digit_count(),
            headers = settings.header_count(),
            "started practice table"
        );
        Ok(Self {
            operation,
            settings,
            sampler,
            table,
            answers: AnswerMap::new(),
            score: ScoreState::empty(),
            focused: None,
        })
    }

    #[must_use]
    pub fn operation(&self) -> Operation {
        self.operation
    }

    #[must_use]
    pub fn settings(&self) -> &PracticeSettings {
        &self.settings
    }

    #[must_use]
    pub fn table(&self) -> &CrossTable {
        &self.table
    }

    #[must_use]
    pub fn answers(&self) -> &AnswerMap {
        &self.answers
    }

    #[must_use]
    pub fn score(&self) -> &ScoreState {
        &self.score
    }

    #[must_use]
    pub fn focused(&self) -> Option<GridCoordinate> {
        self.focused
    }

    /// Record raw learner input for a cell. Blank input clears it.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Score` for a cell outside the table, or
    /// `SessionError::Entry` if the text is not an integer.
    pub fn enter(&mut self, row: usize, col: usize, raw: &str) -> Result<Option<i128>, SessionError> {
        enter_checked(
            &self.table,
            &mut self.answers,
            GridCoordinate::Cell { row, col },
            raw,
        )
    }

    /// # Errors
    ///
    /// Returns `SessionError::Score` for a cell outside the table.
    pub fn clear_answer(&mut self, row: usize, col: usize) -> Result<(), SessionError> {
        self.enter(row, col, "").map(|_| ())
    }

    /// # Errors
    ///
    /// Returns `SessionError::Score` for a cell outside the table.
    pub fn focus(&mut self, row: usize, col: usize) -> Result<(), SessionError> {
        let coord = GridCoordinate::Cell { row, col };
        if !self.table.contains(coord) {
            return Err(ScoreError::UnknownCoordinate(coord).into());
        }
        self.focused = Some(coord);
        Ok(())
    }

    /// Grade the focused cell and merge it into the score.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NoFocus` if no cell has been focused.
    pub fn check_focused(&mut self) -> Result<CellStatus, SessionError> {
        let coord = self.focused.ok_or(SessionError::NoFocus)?;
        self.score = check_cell(&self.table, &self.answers, &self.score, coord)?;
        Ok(self.score.status(coord))
    }

    #[must_use]
    pub fn status(&self, row: usize, col: usize) -> CellStatus {
        self.score.status(GridCoordinate::Cell { row, col })
    }

    /// New headers; answers, score, and focus are wiped.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Generator` if a new table cannot be generated.
    pub fn refresh(&mut self) -> Result<(), SessionError> {
        self.table = generate_cross_table(
            self.operation,
            self.settings.digit_count(),
            self.settings.header_count(),
            &mut self.sampler,
        )?;
        self.answers.clear();
        self.score = ScoreState::empty();
        self.focused = None;
        tracing::debug!(operation = self.operation.as_str(), "refreshed practice table");
        Ok(())
    }

    /// Snapshot the current score as a result ready to save.
    ///
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

    fn addition_table() -> PracticeTableSession<ScriptedSampler> {
        let settings = PracticeSettings::default()
            .with_digit_count(1)
            .unwrap()
            .with_header_count(2)
            .unwrap();
        // Samples alternate column, row: cols [5, 3], rows [7, 2].
        PracticeTableSession::new(
            Operation::Addition,
            settings,
            ScriptedSampler::new(vec![5, 7, 3, 2]),
        )
        .unwrap()
    }

    #[test]
    fn checking_the_focused_cell_grades_only_that_cell() {
        let mut session = addition_table();
        assert_eq!(session.table().row_headers(), &[7, 2]);
        assert_eq!(session.table().col_headers(), &[5, 3]);

        session.enter(0, 0, "12").unwrap();
        session.enter(1, 1, "5").unwrap();
        session.focus(0, 0).unwrap();
        assert_eq!(session.check_focused().unwrap(), CellStatus::Correct);
        assert_eq!(session.status(1, 1), CellStatus::Unchecked);
        assert_eq!(session.score().accuracy(), 100);

        session.enter(0, 0, "11").unwrap();
        assert_eq!(session.check_focused().unwrap(), CellStatus::Incorrect);

        session.focus(1, 1).unwrap();
        assert_eq!(session.check_focused().unwrap(), CellStatus::Correct);
        assert_eq!(session.score().checked_count(), 2);
        assert_eq!(session.score().incorrect_count(), 1);
        assert_eq!(session.score().accuracy(), 50);
    }

    #[test]
    fn check_without_focus_fails() {
        let mut session = addition_table();
        assert!(matches!(
            session.check_focused(),
            Err(SessionError::NoFocus)
        ));
    }

    #[test]
    fn rejects_cells_outside_the_table() {
        let mut session = addition_table();
        assert!(matches!(session.enter(2, 0, "1"), Err(SessionError::Score(_))));
        assert!(matches!(session.focus(0, 5), Err(SessionError::Score(_))));
    }

    #[test]
    fn rejects_non_numeric_entries() {
        let mut session = addition_table();
        assert!(matches!(session.enter(0, 0, "abc"), Err(SessionError::Entry(_))));
        assert!(session.answers().is_empty());
    }

    #[test]
    fn refresh_wipes_answers_and_score() {
        let mut session = addition_table();
        session.enter(0, 0, "12").unwrap();
        session.focus(0, 0).unwrap();
        session.check_focused().unwrap();

        session.refresh().unwrap();
        assert!(session.answers().is_empty());
        assert!(session.score().is_empty());
        assert_eq!(session.focused(), None);
    }

    #[test]
    fn result_carries_kind_digits_and_counts() {
        let mut session = addition_table();
        session.enter(0, 0, "12").unwrap();
        session.focus(0, 0).unwrap();
        session.check_focused().unwrap();
        session.enter(0, 1, "9").unwrap();
        session.focus(0, 1).unwrap();
        session.check_focused().unwrap();

        let result = session.to_result(42, fixed_now()).unwrap();
        assert_eq!(result.kind(), SessionKind::Practice(Operation::Addition));
        assert_eq!(result.difficulty(), 1);
        assert_eq!(result.total_problems(), 2);
        assert_eq!(result.correct(), 1);
        assert_eq!(result.incorrect(), 1);
        assert_eq!(result.accuracy(), 50);
        assert_eq!(result.elapsed_secs(), 42);
    }
}
