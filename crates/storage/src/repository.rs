use async_trait::async_trait;
use mastery_core::model::{SessionKind, SessionResult};
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Mean of `sum / count` rounded half-up; 0 when `count` is 0.
#[must_use]
pub fn rounded_mean(sum: u64, count: u64) -> u8 {
    if count == 0 {
        return 0;
    }
    let mean = (2 * u128::from(sum) + u128::from(count)) / (2 * u128::from(count));
    u8::try_from(mean).unwrap_or(u8::MAX)
}

/// Average accuracy of a set of results.
#[must_use]
pub fn mean_accuracy(results: &[SessionResult]) -> u8 {
    let sum: u64 = results.iter().map(|r| u64::from(r.accuracy())).sum();
    rounded_mean(sum, results.len() as u64)
}

/// Append-only log of completed practice sessions.
#[async_trait]
pub trait SessionRecorder: Send + Sync {
    /// Persist one finished session.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Conflict` if a result with the same id already
    /// exists, or other storage errors.
    async fn append(&self, result: &SessionResult) -> Result<(), StorageError>;

    /// Every stored result. Callers sort as they need.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if results cannot be read.
    async fn query_all(&self) -> Result<Vec<SessionResult>, StorageError>;

    /// Results recorded for one session kind.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if results cannot be read.
    async fn query_by_kind(&self, kind: SessionKind) -> Result<Vec<SessionResult>, StorageError>;

    /// Delete every result. Irreversible.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the store cannot be cleared.
    async fn clear(&self) -> Result<(), StorageError>;

    /// Mean accuracy over all results, or over one kind; 0 when empty.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if results cannot be read.
    async fn average_accuracy(&self, kind: Option<SessionKind>) -> Result<u8, StorageError> {
        let results = match kind {
            Some(kind) => self.query_by_kind(kind).await?,
            None => self.query_all().await?,
        };
        Ok(mean_accuracy(&results))
    }
}

/// Simple in-memory recorder for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRecorder {
    results: Arc<Mutex<Vec<SessionResult>>>,
}

impl InMemoryRecorder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionRecorder for InMemoryRecorder {
    async fn append(&self, result: &SessionResult) -> Result<(), StorageError> {
        let mut guard = self
            .results
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        if guard.iter().any(|r| r.id() == result.id()) {
            return Err(StorageError::Conflict);
        }
        guard.push(result.clone());
        Ok(())
    }

    async fn query_all(&self) -> Result<Vec<SessionResult>, StorageError> {
        let guard = self
            .results
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.clone())
    }

    async fn query_by_kind(&self, kind: SessionKind) -> Result<Vec<SessionResult>, StorageError> {
        let guard = self
            .results
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.iter().filter(|r| r.kind() == kind).cloned().collect())
    }

    async fn clear(&self) -> Result<(), StorageError> {
        let mut guard = self
            .results
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.clear();
        Ok(())
    }
}

/// Recorder behind a trait object for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub results: Arc<dyn SessionRecorder>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            results: Arc::new(InMemoryRecorder::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mastery_core::model::{Operation, SessionResultId};
    use mastery_core::time::fixed_now;

    fn build_result(kind: SessionKind, correct: u32, incorrect: u32, accuracy: u8) -> SessionResult {
        SessionResult::from_persisted(
            SessionResultId::generate(),
            kind,
            2,
            correct + incorrect,
            correct,
            incorrect,
            accuracy,
            120,
            fixed_now(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn round_trips_result_field_by_field() {
        let repo = InMemoryRecorder::new();
        let result = build_result(SessionKind::Practice(Operation::Addition), 7, 3, 70);
        repo.append(&result).await.unwrap();

        let all = repo.query_all().await.unwrap();
        assert_eq!(all, vec![result]);
    }

    #[tokio::test]
    async fn duplicate_ids_conflict() {
        let repo = InMemoryRecorder::new();
        let result = build_result(SessionKind::Aggregation, 1, 0, 100);
        repo.append(&result).await.unwrap();
        assert!(matches!(
            repo.append(&result).await,
            Err(StorageError::Conflict)
        ));
    }

    #[tokio::test]
    async fn filters_and_averages_by_kind() {
        let repo = InMemoryRecorder::new();
        let add = SessionKind::Practice(Operation::Addition);
        repo.append(&build_result(add, 9, 1, 90)).await.unwrap();
        repo.append(&build_result(add, 3, 2, 60)).await.unwrap();
        repo.append(&build_result(SessionKind::Aggregation, 1, 1, 50))
            .await
            .unwrap();

        assert_eq!(repo.query_by_kind(add).await.unwrap().len(), 2);
        assert_eq!(repo.average_accuracy(Some(add)).await.unwrap(), 75);
        // (90 + 60 + 50) / 3 = 66.67
        assert_eq!(repo.average_accuracy(None).await.unwrap(), 67);
    }

    #[tokio::test]
    async fn clear_empties_and_average_falls_back_to_zero() {
        let repo = InMemoryRecorder::new();
        repo.append(&build_result(SessionKind::Aggregation, 2, 0, 100))
            .await
            .unwrap();
        repo.clear().await.unwrap();

        assert!(repo.query_all().await.unwrap().is_empty());
        assert_eq!(repo.average_accuracy(None).await.unwrap(), 0);
    }

    #[test]
    fn rounded_mean_rounds_half_up() {
        assert_eq!(rounded_mean(0, 0), 0);
        assert_eq!(rounded_mean(125, 2), 63);
        assert_eq!(rounded_mean(200, 3), 67);
    }
}
