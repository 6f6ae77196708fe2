use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::model::{Operation, SessionResultId};
use crate::scorer::ScoreState;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionResultError {
    #[error("checked count ({total}) does not match correct + incorrect ({sum})")]
    CountMismatch { total: u32, sum: u32 },

    #[error("accuracy must be between 0 and 100, got {0}")]
    InvalidAccuracy(u8),

    #[error("too many checked problems for a single session: {len}")]
    TooManyProblems { len: usize },

    #[error("unknown session kind: {0}")]
    UnknownKind(String),
}

//
// ─── SESSION KIND ──────────────────────────────────────────────────────────────
//

/// What a saved session practiced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum SessionKind {
    /// Operation drills (cross-table or batch mode).
    Practice(Operation),
    /// Row/column/grand-total aggregation grid.
    Aggregation,
}

impl SessionKind {
    pub const AGGREGATION_TAG: &'static str = "face-two";

    /// Persisted tag: the operation tag, or `face-two` for aggregation.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SessionKind::Practice(op) => op.as_str(),
            SessionKind::Aggregation => Self::AGGREGATION_TAG,
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            SessionKind::Practice(op) => op.label(),
            SessionKind::Aggregation => "Phase Two Calculation",
        }
    }
}

impl fmt::Display for SessionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SessionKind {
    type Err = SessionResultError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "face-two" | "phase-two" => Ok(SessionKind::Aggregation),
            other => other
                .parse::<Operation>()
                .map(SessionKind::Practice)
                .map_err(|_| SessionResultError::UnknownKind(s.to_string())),
        }
    }
}

impl From<SessionKind> for String {
    fn from(kind: SessionKind) -> Self {
        kind.as_str().to_string()
    }
}

impl TryFrom<String> for SessionKind {
    type Error = SessionResultError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

//
// ─── SESSION RESULT ────────────────────────────────────────────────────────────
//

/// Finalized outcome of one practice session.
///
/// Built once at save time and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionResult {
    id: SessionResultId,
    kind: SessionKind,
    difficulty: u32,
    total_problems: u32,
    correct: u32,
    incorrect: u32,
    accuracy: u8,
    elapsed_secs: u64,
    created_at: DateTime<Utc>,
}

impl SessionResult {
    /// Snapshot a score into a new result.
    ///
    /// `difficulty` is the digit count for practice sessions and the grid
    /// dimension for aggregation sessions.
    ///
    /// # Errors
    ///
    /// Returns `SessionResultError::TooManyProblems` if the checked count does
    /// not fit in `u32`.
    pub fn new(
        id: SessionResultId,
        kind: SessionKind,
        difficulty: u32,
        score: &ScoreState,
        elapsed_secs: u64,
        created_at: DateTime<Utc>,
    ) -> Result<Self, SessionResultError> {
        let count = |len: usize| {
            u32::try_from(len).map_err(|_| SessionResultError::TooManyProblems { len })
        };

        Self::from_persisted(
            id,
            kind,
            difficulty,
            count(score.checked_count())?,
            count(score.correct_count())?,
            count(score.incorrect_count())?,
            score.accuracy(),
            elapsed_secs,
            created_at,
        )
    }

    /// Rehydrate a result from persisted storage.
    ///
    /// # Errors
    ///
    /// Returns `SessionResultError::CountMismatch` if counts do not add up, or
    /// `SessionResultError::InvalidAccuracy` if accuracy exceeds 100.
    #[allow(clippy::too_many_arguments)]
    pub fn from_persisted(
        id: SessionResultId,
        kind: SessionKind,
        difficulty: u32,
        total_problems: u32,
        correct: u32,
        incorrect: u32,
        accuracy: u8,
        elapsed_secs: u64,
        created_at: DateTime<Utc>,
    ) -> Result<Self, SessionResultError> {
        let sum = correct.saturating_add(incorrect);
        if sum != total_problems {
            return Err(SessionResultError::CountMismatch {
                total: total_problems,
                sum,
            });
        }
        if accuracy > 100 {
            return Err(SessionResultError::InvalidAccuracy(accuracy));
        }

        Ok(Self {
            id,
            kind,
            difficulty,
            total_problems,
            correct,
            incorrect,
            accuracy,
            elapsed_secs,
            created_at,
        })
    }

    #[must_use]
    pub fn id(&self) -> SessionResultId {
        self.id
    }

    #[must_use]
    pub fn kind(&self) -> SessionKind {
        self.kind
    }

    #[must_use]
    pub fn difficulty(&self) -> u32 {
        self.difficulty
    }

    #[must_use]
    pub fn total_problems(&self) -> u32 {
        self.total_problems
    }

    #[must_use]
    pub fn correct(&self) -> u32 {
        self.correct
    }

    #[must_use]
    pub fn incorrect(&self) -> u32 {
        self.incorrect
    }

    #[must_use]
    pub fn accuracy(&self) -> u8 {
        self.accuracy
    }

    #[must_use]
    pub fn elapsed_secs(&self) -> u64 {
        self.elapsed_secs
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
