//! Reporting windows such as `30d` or `4w`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::{Timestamp, ValidationError};

/// A look-back window measured in whole days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeRange {
    days: u32,
}

impl TimeRange {
    /// Largest accepted window (ten years).
    pub const MAX_DAYS: u32 = 3650;

    pub fn days(days: u32) -> Result<Self, ValidationError> {
        if days == 0 || days > Self::MAX_DAYS {
            return Err(ValidationError::out_of_range(
                "time_range",
                1,
                i64::from(Self::MAX_DAYS),
                i64::from(days),
            ));
        }
        Ok(Self { days })
    }

    pub fn in_days(&self) -> u32 {
        self.days
    }

    /// Start of the window ending at `now`.
    pub fn start_from(&self, now: Timestamp) -> Timestamp {
        now.minus_days(i64::from(self.days))
    }
}

impl Default for TimeRange {
    fn default() -> Self {
        Self { days: 30 }
    }
}

impl FromStr for TimeRange {
    type Err = ValidationError;

    /// Accepts `<N>d`, `<N>w` or a bare `<N>` (days).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || {
            ValidationError::invalid_format("time_range", format!("expected <N>d, <N>w or <N>, got '{}'", s))
        };
        let (digits, multiplier) = match s.as_bytes().last() {
            Some(b'd') => (&s[..s.len() - 1], 1),
            Some(b'w') => (&s[..s.len() - 1], 7),
            Some(_) => (s, 1),
            None => return Err(invalid()),
        };
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let n: u32 = digits.parse().map_err(|_| invalid())?;
        let days = n.checked_mul(multiplier).ok_or_else(invalid)?;
        Self::days(days)
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}d", self.days)
    }
}
