use crate::generator::GeneratorError;

/// Largest digit count whose range still fits in `u64`.
pub const MAX_DIGITS: u32 = 19;

/// Inclusive operand bounds derived from a digit count.
///
/// One digit covers `0..=9`; `d` digits cover `10^(d-1)..=10^d - 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DigitRange {
    digits: u32,
    min: u64,
    max: u64,
}

impl DigitRange {
    /// Build the range for `digits` decimal digits.
    ///
    /// # Errors
    ///
    /// Returns `GeneratorError::InvalidParameter` when `digits` is 0 or above
    /// `MAX_DIGITS`.
    pub fn new(digits: u32) -> Result<Self, GeneratorError> {
        if digits == 0 {
            return Err(GeneratorError::invalid("digit_count", "must be at least 1"));
        }
        let upper = 10_u64
            .checked_pow(digits)
            .filter(|_| digits <= MAX_DIGITS)
            .ok_or_else(|| {
                GeneratorError::invalid("digit_count", format!("must be at most {MAX_DIGITS}"))
            })?;
        let min = if digits == 1 { 0 } else { upper / 10 };

        Ok(Self {
            digits,
            min,
            max: upper - 1,
        })
    }

    #[must_use]
    pub fn digits(&self) -> u32 {
        self.digits
    }

    #[must_use]
    pub fn min(&self) -> u64 {
        self.min
    }

    #[must_use]
    pub fn max(&self) -> u64 {
        self.max
    }

    #[must_use]
    pub fn contains(&self, value: u64) -> bool {
        (self.min..=self.max).contains(&value)
    }
}
