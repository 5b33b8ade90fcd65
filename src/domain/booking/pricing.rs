//! Booking price calculation.
//!
//! The total is the companion's hourly rate times the booked whole hours. The
//! platform keeps a fixed 15% of the total, rounded half-up to the cent, and the
//! companion earns the remainder, so the three amounts always reconcile.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::{Money, Percentage, ValidationError};

/// Share of every booking retained by the platform.
pub const PLATFORM_FEE_RATE: Percentage = Percentage::new(15);

/// Booked length in whole hours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct DurationHours(u32);

impl DurationHours {
    pub const MIN: u32 = 1;
    pub const MAX: u32 = 24;

    pub fn try_new(hours: u32) -> Result<Self, ValidationError> {
        if !(Self::MIN..=Self::MAX).contains(&hours) {
            return Err(ValidationError::out_of_range(
                "duration_hours",
                i64::from(Self::MIN),
                i64::from(Self::MAX),
                i64::from(hours),
            ));
        }
        Ok(Self(hours))
    }

    pub fn value(&self) -> u32 {
        self.0
    }
}

impl TryFrom<u32> for DurationHours {
    type Error = ValidationError;

    fn try_from(hours: u32) -> Result<Self, Self::Error> {
        Self::try_new(hours)
    }
}

impl From<DurationHours> for u32 {
    fn from(hours: DurationHours) -> Self {
        hours.0
    }
}

impl fmt::Display for DurationHours {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}h", self.0)
    }
}

/// Total, platform fee and companion earnings of one booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeSplit {
    pub total: Money,
    pub platform_fee: Money,
    pub companion_earnings: Money,
}

impl FeeSplit {
    /// Prices a booking from the companion's hourly rate.
    pub fn for_booking(hourly_rate: Money, duration: DurationHours) -> Result<Self, ValidationError> {
        if !hourly_rate.is_positive() {
            return Err(ValidationError::invalid_format(
                "hourly_rate",
                "companion rate must be positive",
            ));
        }
        let total = hourly_rate
            .checked_times(duration.value())
            .ok_or_else(|| ValidationError::invalid_format("total_amount", "amount overflows"))?;
        Ok(Self::from_total(total))
    }

    /// Splits an already-known total.
    pub fn from_total(total: Money) -> Self {
        let platform_fee = total.share(PLATFORM_FEE_RATE);
        Self {
            total,
            platform_fee,
            companion_earnings: total - platform_fee,
        }
    }
}
