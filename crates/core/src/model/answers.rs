use std::collections::HashMap;
use thiserror::Error;

use crate::model::GridCoordinate;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum EntryError {
    #[error("not a whole number: {raw:?}")]
    NotANumber { raw: String },
}

/// Parse a learner's raw text entry.
///
/// Blank input means "not attempted" and yields `Ok(None)`.
///
/// # Errors
///
/// Returns `EntryError::NotANumber` for anything other than an optional sign
/// followed by decimal digits.
pub fn parse_entry(raw: &str) -> Result<Option<i128>, EntryError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed
        .parse::<i128>()
        .map(Some)
        .map_err(|_| EntryError::NotANumber {
            raw: raw.to_string(),
        })
}

/// Learner entries keyed by grid coordinate.
///
/// An absent key means the cell has not been attempted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnswerMap {
    entries: HashMap<GridCoordinate, i128>,
}

impl AnswerMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set or clear the entry for `coord`.
    pub fn set(&mut self, coord: GridCoordinate, value: Option<i128>) {
        match value {
            Some(v) => {
                self.entries.insert(coord, v);
            }
            None => {
                self.entries.remove(&coord);
            }
        }
    }

    /// Parse `raw` and store it for `coord`.
    ///
    /// # Errors
    ///
    /// Returns `EntryError` if `raw` is not blank and not a whole number; the
    /// previous entry is left untouched in that case.
    pub fn enter(&mut self, coord: GridCoordinate, raw: &str) -> Result<Option<i128>, EntryError> {
        let parsed = parse_entry(raw)?;
        self.set(coord, parsed);
        Ok(parsed)
    }

    #[must_use]
    pub fn get(&self, coord: GridCoordinate) -> Option<i128> {
        self.entries.get(&coord).copied()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn coordinates(&self) -> impl Iterator<Item = GridCoordinate> + '_ {
        self.entries.keys().copied()
    }
}
