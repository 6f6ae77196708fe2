//! Shared error types for the services crate.

use thiserror::Error;

use mastery_core::generator::GeneratorError;
use mastery_core::model::{EntryError, SessionResultError};
use mastery_core::scorer::ScoreError;
use mastery_core::timer::TimerError;
use storage::repository::StorageError;

/// Errors emitted by practice sessions.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error("no problem at index {index} (batch has {len})")]
    ProblemOutOfRange { index: usize, len: usize },
    #[error("no cell is focused")]
    NoFocus,
    #[error(transparent)]
    Generator(#[from] GeneratorError),
    #[error(transparent)]
    Score(#[from] ScoreError),
    #[error(transparent)]
    Entry(#[from] EntryError),
    #[error(transparent)]
    Result(#[from] SessionResultError),
}

/// Errors emitted by `HistoryService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum HistoryError {
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `TimerDriver`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TimerDriverError {
    #[error(transparent)]
    Timer(#[from] TimerError),
    #[error("timer driver requires a running tokio runtime")]
    NoRuntime,
}
