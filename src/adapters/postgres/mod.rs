//! PostgreSQL adapters - Database implementations for repository ports.
//!
//! - `PostgresProfileRepository` - profiles and companion rates
//! - `PostgresBookingRepository` - bookings and payment settlement
//! - `PostgresConversationRepository` - conversations and messages
//! - `PostgresBehaviorRepository` - append-only behaviour log
//! - `PostgresHealthCheck` - connectivity check for `/health`
//!
//! Multi-row writes (message send, mark read, settlement) run inside a single
//! transaction.

mod behavior_repository;
mod booking_repository;
mod conversation_repository;
mod health_check;
mod profile_repository;

pub use behavior_repository::PostgresBehaviorRepository;
pub use booking_repository::PostgresBookingRepository;
pub use conversation_repository::PostgresConversationRepository;
pub use health_check::PostgresHealthCheck;
pub use profile_repository::PostgresProfileRepository;

use std::fmt::Display;
use std::str::FromStr;

use crate::domain::foundation::DomainError;

/// Parses a stored enum column, treating unknown values as corrupt data.
fn parse_column<T>(column: &str, raw: &str) -> Result<T, DomainError>
where
    T: FromStr,
    T::Err: Display,
{
    raw.parse()
        .map_err(|e| DomainError::database(format!("invalid {} value '{}': {}", column, raw, e)))
}

/// Converts a non-negative INTEGER column into a counter.
fn counter(column: &str, raw: i32) -> Result<u32, DomainError> {
    u32::try_from(raw)
        .map_err(|_| DomainError::database(format!("negative {} value {}", column, raw)))
}
