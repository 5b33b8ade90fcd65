//! Marketplace role carried on every profile and session.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::ValidationError;

/// Role of a marketplace participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserType {
    /// Books and pays for time.
    #[default]
    Client,
    /// Offers bookable time at an hourly rate.
    Companion,
    /// Platform operator.
    Admin,
}

impl UserType {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserType::Client => "client",
            UserType::Companion => "companion",
            UserType::Admin => "admin",
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, UserType::Admin)
    }
}

impl fmt::Display for UserType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "client" => Ok(UserType::Client),
            "companion" => Ok(UserType::Companion),
            "admin" => Ok(UserType::Admin),
            other => Err(ValidationError::invalid_format(
                "user_type",
                format!("unknown user type '{}'", other),
            )),
        }
    }
}
