//! Behaviour event log port.

use async_trait::async_trait;

use crate::domain::analytics::BehaviorEvent;
use crate::domain::foundation::{DomainError, Timestamp, UserId};

/// Append-only store of behaviour events.
#[async_trait]
pub trait BehaviorRepository: Send + Sync {
    async fn append(&self, event: &BehaviorEvent) -> Result<(), DomainError>;

    /// Every event created at or after `since`.
    async fn created_since(&self, since: Timestamp) -> Result<Vec<BehaviorEvent>, DomainError>;

    /// The user's most recent events, newest first, at most `limit`.
    async fn recent_for_user(
        &self,
        user_id: &UserId,
        limit: usize,
    ) -> Result<Vec<BehaviorEvent>, DomainError>;
}
