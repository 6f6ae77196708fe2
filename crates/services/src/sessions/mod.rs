//! Practice session state machines.
//!
//! Sessions are synchronous and owned by one caller. They hold the generated
//! grid, learner answers, and the current score; elapsed time comes from the
//! caller's timer when a result is built.

mod aggregation;
mod drill;
mod table;

pub use crate::error::SessionError;
pub use aggregation::AggregationSession;
pub use drill::DrillSession;
pub use table::PracticeTableSession;

use mastery_core::model::{AnswerMap, GridCoordinate};
use mastery_core::scorer::{ExpectedValues, ScoreError};

/// Parse `raw` into `answers` after checking `coord` belongs to `grid`.
fn enter_checked<G: ExpectedValues + ?Sized>(
    grid: &G,
    answers: &mut AnswerMap,
    coord: GridCoordinate,
    raw: &str,
) -> Result<Option<i128>, SessionError> {
    if !grid.contains(coord) {
        return Err(ScoreError::UnknownCoordinate(coord).into());
    }
    Ok(answers.enter(coord, raw)?)
}
