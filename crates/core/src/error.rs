use thiserror::Error;

use crate::generator::GeneratorError;
use crate::model::{EntryError, SessionResultError, SettingsError};
use crate::scorer::ScoreError;
use crate::timer::TimerError;

/// Umbrella error for callers that do not care which engine step failed.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Generator(#[from] GeneratorError),
    #[error(transparent)]
    Score(#[from] ScoreError),
    #[error(transparent)]
    Entry(#[from] EntryError),
    #[error(transparent)]
    Timer(#[from] TimerError),
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error(transparent)]
    SessionResult(#[from] SessionResultError),
}
