use thiserror::Error;

use crate::model::digits::MAX_DIGITS;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SettingsError {
    #[error("digit count must be between 1 and 19")]
    InvalidDigitCount,

    #[error("operand count must be at least 2")]
    InvalidOperandCount,

    #[error("header count must be > 0")]
    InvalidHeaderCount,

    #[error("grid dimension must be > 0")]
    InvalidGridDimension,
}

//
// ─── SETTINGS ──────────────────────────────────────────────────────────────────
//

/// Knobs for generating a practice session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PracticeSettings {
    digit_count: u32,
    operand_count: usize,
    batch_size: usize,
    header_count: usize,
    grid_dimension: usize,
    grid_digit_count: u32,
}

impl Default for PracticeSettings {
    /// Two-digit pairs, ten problems per batch, a 10×10 cross table, and a
    /// 5×5 two-digit aggregation grid.
    fn default() -> Self {
        Self {
            digit_count: 2,
            operand_count: 2,
            batch_size: 10,
            header_count: 10,
            grid_dimension: 5,
            grid_digit_count: 2,
        }
    }
}

fn check_digits(digits: u32) -> Result<u32, SettingsError> {
    if (1..=MAX_DIGITS).contains(&digits) {
        Ok(digits)
    } else {
        Err(SettingsError::InvalidDigitCount)
    }
}

impl PracticeSettings {
    /// Settings for operand problems; the grid knobs keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError` if `digit_count` or `operand_count` is out of range.
    pub fn new(
        digit_count: u32,
        operand_count: usize,
        batch_size: usize,
    ) -> Result<Self, SettingsError> {
        Self::default()
            .with_digit_count(digit_count)?
            .with_operand_count(operand_count)
            .map(|s| s.with_batch_size(batch_size))
    }

    /// # Errors
    ///
    /// Returns `SettingsError::InvalidDigitCount` outside `1..=MAX_DIGITS`.
    pub fn with_digit_count(mut self, digit_count: u32) -> Result<Self, SettingsError> {
        self.digit_count = check_digits(digit_count)?;
        Ok(self)
    }

    /// # Errors
    ///
    /// Returns `SettingsError::InvalidOperandCount` below 2.
    pub fn with_operand_count(mut self, operand_count: usize) -> Result<Self, SettingsError> {
        if operand_count < 2 {
            return Err(SettingsError::InvalidOperandCount);
        }
        self.operand_count = operand_count;
        Ok(self)
    }

    #[must_use]
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// # Errors
    ///
    /// Returns `SettingsError::InvalidHeaderCount` for 0.
    pub fn with_header_count(mut self, header_count: usize) -> Result<Self, SettingsError> {
        if header_count == 0 {
            return Err(SettingsError::InvalidHeaderCount);
        }
        self.header_count = header_count;
        Ok(self)
    }

    /// # Errors
    ///
    /// Returns `SettingsError` for a zero dimension or an invalid digit count.
    pub fn with_grid(mut self, dimension: usize, digit_count: u32) -> Result<Self, SettingsError> {
        if dimension == 0 {
            return Err(SettingsError::InvalidGridDimension);
        }
        self.grid_digit_count = check_digits(digit_count)?;
        self.grid_dimension = dimension;
        Ok(self)
    }

    #[must_use]
    pub fn digit_count(&self) -> u32 {
        self.digit_count
    }

    #[must_use]
    pub fn operand_count(&self) -> usize {
        self.operand_count
    }

    #[must_use]
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    #[must_use]
    pub fn header_count(&self) -> usize {
        self.header_count
    }

    #[must_use]
    pub fn grid_dimension(&self) -> usize {
        self.grid_dimension
    }

    #[must_use]
    pub fn grid_digit_count(&self) -> u32 {
        self.grid_digit_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_classic_layout() {
        let s = PracticeSettings::default();
        assert_eq!(s.digit_count(), 2);
        assert_eq!(s.header_count(), 10);
        assert_eq!(s.grid_dimension(), 5);
        assert_eq!(s.grid_digit_count(), 2);
    }

    #[test]
    fn validates_each_knob() {
        assert_eq!(
            PracticeSettings::new(0, 2, 10),
            Err(SettingsError::InvalidDigitCount)
        );
        assert_eq!(
            PracticeSettings::new(2, 1, 10),
            Err(SettingsError::InvalidOperandCount)
        );
        assert_eq!(
            PracticeSettings::default().with_header_count(0),
            Err(SettingsError::InvalidHeaderCount)
        );
        assert_eq!(
            PracticeSettings::default().with_grid(0, 2),
            Err(SettingsError::InvalidGridDimension)
        );
    }

    #[test]
    fn zero_batch_is_allowed() {
        let s = PracticeSettings::new(3, 4, 0).unwrap();
        assert_eq!(s.batch_size(), 0);
        assert_eq!(s.operand_count(), 4);
    }
}
