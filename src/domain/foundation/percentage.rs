//! Whole-number rates such as the platform fee.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A rate from 0 to 100; larger inputs saturate at 100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Percentage(u8);

impl Percentage {
    pub const fn new(value: u8) -> Self {
        Self(if value > 100 { 100 } else { value })
    }

    pub fn value(&self) -> u8 {
        self.0
    }
}

impl fmt::Display for Percentage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn saturates_at_one_hundred() {
        assert_eq!(Percentage::new(250).value(), 100);
    }

    #[test]
    fn displays_as_rate() {
        assert_eq!(Percentage::new(15).to_string(), "15%");
    }
}
