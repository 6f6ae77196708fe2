use mastery_core::model::{SessionKind, SessionResult, SessionResultId};
use sqlx::Row;

use crate::repository::StorageError;

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

pub(crate) fn conn<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

fn u32_from_i64(field: &'static str, v: i64) -> Result<u32, StorageError> {
    u32::try_from(v).map_err(|_| StorageError::Serialization(format!("invalid {field}: {v}")))
}

pub(crate) fn u64_to_i64(field: &'static str, v: u64) -> Result<i64, StorageError> {
    i64::try_from(v).map_err(|_| StorageError::Serialization(format!("{field} overflow")))
}

pub(crate) fn map_result_row(row: &sqlx::sqlite::SqliteRow) -> Result<SessionResult, StorageError> {
    let id: SessionResultId = row
        .try_get::<String, _>("id")
        .map_err(ser)?
        .parse()
        .map_err(ser)?;
    let kind: SessionKind = row
        .try_get::<String, _>("kind")
        .map_err(ser)?
        .parse()
        .map_err(ser)?;

    let difficulty = u32_from_i64("difficulty", row.try_get("difficulty").map_err(ser)?)?;
    let total_problems = u32_from_i64(
        "total_problems",
        row.try_get("total_problems").map_err(ser)?,
    )?;
    let correct = u32_from_i64("correct", row.try_get("correct").map_err(ser)?)?;
    let incorrect = u32_from_i64("incorrect", row.try_get("incorrect").map_err(ser)?)?;

    let accuracy_i64: i64 = row.try_get("accuracy").map_err(ser)?;
    let accuracy = u8::try_from(accuracy_i64)
        .map_err(|_| StorageError::Serialization(format!("invalid accuracy: {accuracy_i64}")))?;

    let elapsed_i64: i64 = row.try_get("elapsed_secs").map_err(ser)?;
    let elapsed_secs = u64::try_from(elapsed_i64)
        .map_err(|_| StorageError::Serialization(format!("invalid elapsed_secs: {elapsed_i64}")))?;

    let created_at = row.try_get("created_at").map_err(ser)?;

    SessionResult::from_persisted(
        id,
        kind,
        difficulty,
        total_problems,
        correct,
        incorrect,
        accuracy,
        elapsed_secs,
        created_at,
    )
    .map_err(ser)
}
