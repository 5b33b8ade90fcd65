//! Fixed-point currency amounts.
//!
//! Amounts are held as a signed count of minor units (cents). All booking
//! arithmetic happens on integers; conversion from a major-unit float only
//! happens at the API boundary and rounds half-up to the nearest cent.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, Sub};

use super::{Percentage, ValidationError};

/// An amount of money in minor units (cents).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    /// Zero.
    pub const ZERO: Self = Self(0);

    /// Creates an amount from minor units.
    pub const fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    /// Creates an amount from major units, rounding half-up to whole cents.
    ///
    /// Rejects negative, NaN and infinite values.
    pub fn from_major_units(amount: f64) -> Result<Self, ValidationError> {
        if !amount.is_finite() || amount < 0.0 {
            return Err(ValidationError::invalid_format(
                "amount",
                "must be a non-negative finite number",
            ));
        }
        let cents = (amount * 100.0 + 0.5).floor();
        if cents > i64::MAX as f64 {
            return Err(ValidationError::invalid_format("amount", "too large"));
        }
        Ok(Self(cents as i64))
    }

    /// Returns the amount in minor units.
    pub fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the amount in major units (for display only).
    pub fn as_major_units(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// True when strictly greater than zero.
    pub fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Multiplies by a whole quantity, failing on overflow.
    pub fn checked_times(&self, quantity: u32) -> Option<Self> {
        self.0.checked_mul(i64::from(quantity)).map(Self)
    }

    /// Takes a percentage share, rounding half-up to whole cents.
    pub fn share(&self, percent: Percentage) -> Self {
        let scaled = i128::from(self.0) * i128::from(percent.value());
        let rounded = (scaled + 50).div_euclid(100);
        Self(rounded as i64)
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money(self.0 + rhs.0)
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Money) -> Money {
        Money(self.0 - rhs.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, Add::add)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{}{}.{:02}", sign, abs / 100, abs % 100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_major_units_rounds_half_up() {
        assert_eq!(Money::from_major_units(200.0).unwrap().cents(), 20_000);
        assert_eq!(Money::from_major_units(10.125).unwrap().cents(), 1_013);
        assert_eq!(Money::from_major_units(0.004).unwrap().cents(), 0);
    }

    #[test]
    fn from_major_units_rejects_negative_and_nan() {
        assert!(Money::from_major_units(-1.0).is_err());
        assert!(Money::from_major_units(f64::NAN).is_err());
        assert!(Money::from_major_units(f64::INFINITY).is_err());
    }

    #[test]
    fn share_rounds_half_up() {
        let fifteen = Percentage::new(15);
        assert_eq!(Money::from_cents(20_000).share(fifteen).cents(), 3_000);
        // 15% of 0.10 = 0.015 -> 0.02
        assert_eq!(Money::from_cents(10).share(fifteen).cents(), 2);
        // 15% of 0.03 = 0.0045 -> 0.00
        assert_eq!(Money::from_cents(3).share(fifteen).cents(), 0);
    }

    #[test]
    fn checked_times_detects_overflow() {
        assert_eq!(
            Money::from_cents(10_000).checked_times(2),
            Some(Money::from_cents(20_000))
        );
        assert_eq!(Money::from_cents(i64::MAX).checked_times(2), None);
    }

    #[test]
    fn sums_and_displays() {
        let total: Money = [Money::from_cents(150), Money::from_cents(1_005)]
            .into_iter()
            .sum();
        assert_eq!(total.to_string(), "11.55");
        assert_eq!(Money::from_cents(-5).to_string(), "-0.05");
    }
}
