use mastery_core::model::{SessionKind, SessionResult};

use super::SqliteRepository;
use super::mapping::{conn, map_result_row, u64_to_i64};
use crate::repository::{SessionRecorder, StorageError};

const SELECT_COLUMNS: &str = r"
    SELECT
        id, kind, difficulty, total_problems, correct,
        incorrect, accuracy, elapsed_secs, created_at
    FROM session_results
";

fn map_rows(rows: &[sqlx::sqlite::SqliteRow]) -> Result<Vec<SessionResult>, StorageError> {
    rows.iter().map(map_result_row).collect()
}

#[async_trait::async_trait]
impl SessionRecorder for SqliteRepository {
    async fn append(&self, result: &SessionResult) -> Result<(), StorageError> {
        let res = sqlx::query(
            r"
                INSERT INTO session_results (
                    id, kind, difficulty, total_problems, correct,
                    incorrect, accuracy, elapsed_secs, created_at
                )
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            ",
        )
        .bind(result.id().to_string())
        .bind(result.kind().as_str())
        .bind(i64::from(result.difficulty()))
        .bind(i64::from(result.total_problems()))
        .bind(i64::from(result.correct()))
        .bind(i64::from(result.incorrect()))
        .bind(i64::from(result.accuracy()))
        .bind(u64_to_i64("elapsed_secs", result.elapsed_secs())?)
        .bind(result.created_at())
        .execute(&self.pool)
        .await;

        match res {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                Err(StorageError::Conflict)
            }
            Err(e) => Err(conn(e)),
        }
    }

    async fn query_all(&self) -> Result<Vec<SessionResult>, StorageError> {
        let sql = format!("{SELECT_COLUMNS} ORDER BY created_at ASC, id ASC");
        let rows = sqlx::query(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(conn)?;
        map_rows(&rows)
    }

    async fn query_by_kind(&self, kind: SessionKind) -> Result<Vec<SessionResult>, StorageError> {
        let sql = format!("{SELECT_COLUMNS} WHERE kind = ?1 ORDER BY created_at ASC, id ASC");
        let rows = sqlx::query(&sql)
            .bind(kind.as_str())
            .fetch_all(&self.pool)
            .await
            .map_err(conn)?;
        map_rows(&rows)
    }

    async fn clear(&self) -> Result<(), StorageError> {
        let res = sqlx::query("DELETE FROM session_results")
            .execute(&self.pool)
            .await
            .map_err(conn)?;
        tracing::debug!(deleted = res.rows_affected(), "cleared session results");
        Ok(())
    }

    async fn average_accuracy(&self, kind: Option<SessionKind>) -> Result<u8, StorageError> {
        let row: (Option<i64>, i64) = match kind {
            Some(kind) => {
                sqlx::query_as(
                    "SELECT SUM(accuracy), COUNT(*) FROM session_results WHERE kind = ?1",
                )
                .bind(kind.as_str())
                .fetch_one(&self.pool)
                .await
            }
            None => {
                sqlx::query_as("SELECT SUM(accuracy), COUNT(*) FROM session_results")
                    .fetch_one(&self.pool)
                    .await
            }
        }
        .map_err(conn)?;

        let sum = u64::try_from(row.0.unwrap_or(0)).unwrap_or(0);
        let count = u64::try_from(row.1).unwrap_or(0);
        Ok(crate::repository::rounded_mean(sum, count))
    }
}
