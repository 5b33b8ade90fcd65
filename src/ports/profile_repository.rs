//! Profile repository port.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, Money, UserId};
use crate::domain::profile::{ParticipantSummary, Profile};

/// Persistence for marketplace profiles and companion rates.
///
/// Earnings are credited by [`BookingRepository::settle_payment`] in the same
/// transaction that marks the booking paid, never through this port.
///
/// [`BookingRepository::settle_payment`]: super::BookingRepository::settle_payment
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    /// Inserts the profile written right after sign-up.
    ///
    /// # Errors
    ///
    /// - `DatabaseError` on failure, including a duplicate id
    async fn insert(&self, profile: &Profile) -> Result<(), DomainError>;

    async fn find_by_id(&self, id: &UserId) -> Result<Option<Profile>, DomainError>;

    /// Display fields for each id that has a profile; unknown ids are skipped.
    async fn find_summaries(&self, ids: &[UserId]) -> Result<Vec<ParticipantSummary>, DomainError>;

    /// Hourly rate of a companion, `None` when none is registered.
    async fn companion_rate(&self, companion_id: &UserId) -> Result<Option<Money>, DomainError>;
}
