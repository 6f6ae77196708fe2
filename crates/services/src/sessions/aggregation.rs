use chrono::{DateTime, Utc};
use mastery_core::generator::{OperandSampler, generate_aggregation_grid};
use mastery_core::model::{
    AggregationGrid, AnswerMap, GridCoordinate, PracticeSettings, SessionKind, SessionResult,
    SessionResultId,
};
use mastery_core::scorer::{CellStatus, ScoreState, full_recheck};

use super::enter_checked;
use crate::error::SessionError;

/// Aggregation practice: sum every row, every column, and the whole grid.
pub struct AggregationSession<S> {
    settings: PracticeSettings,
    sampler: S,
    grid: AggregationGrid,
    answers: AnswerMap,
    score: ScoreState,
}

impl<S: OperandSampler> AggregationSession<S> {
    /// # Errors
    ///
    /// Returns `SessionError::Generator` if the grid cannot be generated.
    pub fn new(settings: PracticeSettings, mut sampler: S) -> Result<Self, SessionError> {
        let grid = generate_aggregation_grid(
            settings.grid_dimension(),
            settings.grid_digit_count(),
            &mut sampler,
        )?;
        tracing::debug!(
            dimension = settings.grid_dimension(),
            digits = settings.grid_digit_count(),
            "started aggregation grid"
        );
        Ok(Self {
            settings,
            sampler,
            grid,
            answers: AnswerMap::new(),
            score: ScoreState::empty(),
        })
    }

    #[must_use]
    pub fn grid(&self) -> &AggregationGrid {
        &self.grid
    }

    #[must_use]
    pub fn answers(&self) -> &AnswerMap {
        &self.answers
    }

    #[must_use]
    pub fn score(&self) -> &ScoreState {
        &self.score
    }

    /// Record raw learner input for a row sum, column sum, or the grand total.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Score` for a key the grid does not define, or
    /// `SessionError::Entry` if the text is not an integer.
    pub fn enter(&mut self, coord: GridCoordinate, raw: &str) -> Result<Option<i128>, SessionError> {
        enter_checked(&self.grid, &mut self.answers, coord, raw)
    }

    /// # Errors
    ///
    /// Returns `SessionError::Score` for a key the grid does not define.
    pub fn clear_answer(&mut self, coord: GridCoordinate) -> Result<(), SessionError> {
        self.enter(coord, "").map(|_| ())
    }

    /// Grade every answered key from scratch.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Score` if the answers hold a foreign key.
    pub fn recheck(&mut self) -> Result<&ScoreState, SessionError> {
        self.score = full_recheck(&self.grid, &self.answers)?;
        Ok(&self.score)
    }

    #[must_use]
    pub fn status(&self, coord: GridCoordinate) -> CellStatus {
        self.score.status(coord)
    }

    /// New grid values; answers and score are wiped.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Generator` if a new grid cannot be generated.
    pub fn refresh(&mut self) -> Result<(), SessionError> {
        self.grid = generate_aggregation_grid(
            self.settings.grid_dimension(),
            self.settings.grid_digit_count(),
            &mut self.sampler,
        )?;
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
        let dimension = u32::try_from(self.grid.dimension()).unwrap_or(u32::MAX);
        Ok(SessionResult::new(
            SessionResultId::generate(),
            SessionKind::Aggregation,
            dimension,
            &self.score,
            elapsed_secs,
            created_at,
        )?)
    }
}
