//! Saved-session history: persistence plus the queries behind progress views.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use mastery_core::model::{SessionKind, SessionResult};
use serde::Serialize;
use storage::repository::{SessionRecorder, mean_accuracy};

use crate::Clock;
use crate::error::HistoryError;

/// Sessions shown in an accuracy trend when the caller does not choose.
pub const DEFAULT_TREND_LEN: usize = 14;

/// Results completed on one calendar day (UTC), newest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayGroup {
    pub day: NaiveDate,
    pub results: Vec<SessionResult>,
}

/// One point of an accuracy trend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TrendPoint {
    /// 1-based position within the trend window.
    pub session: usize,
    pub accuracy: u8,
    pub created_at: DateTime<Utc>,
}

/// Headline numbers for a progress view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HistorySummary {
    pub sessions: usize,
    pub average_accuracy: u8,
    pub problems_solved: u64,
    pub total_elapsed_secs: u64,
}

/// Saves finished sessions and answers history queries.
#[derive(Clone)]
pub struct HistoryService {
    clock: Clock,
    recorder: Arc<dyn SessionRecorder>,
}

impl HistoryService {
    #[must_use]
    pub fn new(clock: Clock, recorder: Arc<dyn SessionRecorder>) -> Self {
        Self { clock, recorder }
    }

    /// Current time from the injected clock, for stamping new results.
    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Append a finished session.
    ///
    /// # Errors
    ///
    /// Returns `HistoryError::Storage` if the recorder rejects the write. The
    /// failure is also logged.
    pub async fn save(&self, result: &SessionResult) -> Result<(), HistoryError> {
        if let Err(err) = self.recorder.append(result).await {
            tracing::error!(
                id = %result.id(),
                kind = result.kind().as_str(),
                error = %err,
                "failed to save session result"
            );
            return Err(err.into());
        }
        tracing::info!(
            id = %result.id(),
            kind = result.kind().as_str(),
            accuracy = result.accuracy(),
            "saved session result"
        );
        Ok(())
    }

    async fn fetch(&self, kind: Option<SessionKind>) -> Result<Vec<SessionResult>, HistoryError> {
        Ok(match kind {
            Some(kind) => self.recorder.query_by_kind(kind).await?,
            None => self.recorder.query_all().await?,
        })
    }

    /// Saved results, newest first.
    ///
    /// # Errors
    ///
    /// Returns `HistoryError::Storage` if results cannot be read.
    pub async fn list(&self, kind: Option<SessionKind>) -> Result<Vec<SessionResult>, HistoryError> {
        let mut results = self.fetch(kind).await?;
        results.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
        Ok(results)
    }

    /// Results bucketed by UTC day, newest day first.
    ///
    /// # Errors
    ///
    /// Returns `HistoryError::Storage` if results cannot be read.
    pub async fn grouped_by_day(
        &self,
        kind: Option<SessionKind>,
    ) -> Result<Vec<DayGroup>, HistoryError> {
        let mut groups: Vec<DayGroup> = Vec::new();
        for result in self.list(kind).await? {
            let day = result.created_at().date_naive();
            match groups.last_mut() {
                Some(group) if group.day == day => group.results.push(result),
                _ => groups.push(DayGroup {
                    day,
                    results: vec![result],
                }),
            }
        }
        Ok(groups)
    }

    /// Accuracy of the last `last_n` sessions, oldest to newest.
    ///
    /// # Errors
    ///
    /// Returns `HistoryError::Storage` if results cannot be read.
    pub async fn trend(
        &self,
        kind: Option<SessionKind>,
        last_n: usize,
    ) -> Result<Vec<TrendPoint>, HistoryError> {
        let mut results = self.fetch(kind).await?;
        results.sort_by_key(SessionResult::created_at);
        let skip = results.len().saturating_sub(last_n);
        Ok(results
            .iter()
            .skip(skip)
            .enumerate()
            .map(|(i, r)| TrendPoint {
                session: i + 1,
                accuracy: r.accuracy(),
                created_at: r.created_at(),
            })
            .collect())
    }

    /// Mean accuracy, 0 when nothing is saved.
    ///
    /// # Errors
    ///
    /// Returns `HistoryError::Storage` if results cannot be read.
    pub async fn average_accuracy(&self, kind: Option<SessionKind>) -> Result<u8, HistoryError> {
        Ok(self.recorder.average_accuracy(kind).await?)
    }

    /// # Errors
    ///
    /// Returns `HistoryError::Storage` if results cannot be read.
    pub async fn summary(&self, kind: Option<SessionKind>) -> Result<HistorySummary, HistoryError> {
        let results = self.fetch(kind).await?;
        Ok(HistorySummary {
            sessions: results.len(),
            average_accuracy: mean_accuracy(&results),
            problems_solved: results.iter().map(|r| u64::from(r.total_problems())).sum(),
            total_elapsed_secs: results.iter().map(SessionResult::elapsed_secs).sum(),
        })
    }

    /// Delete every saved result.
    ///
    /// # Errors
    ///
    /// Returns `HistoryError::Storage` if the recorder cannot be cleared.
    pub async fn clear(&self) -> Result<(), HistoryError> {
        self.recorder.clear().await?;
        tracing::info!("cleared session history");
        Ok(())
    }
}
