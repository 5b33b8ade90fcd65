//! Marketplace profiles.
//!
//! A profile is created exactly once per identity-provider user, with the same
//! id. Companions additionally carry an hourly rate and accumulate earnings.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{Money, Timestamp, UserId, UserType};

/// Marketplace profile keyed by the identity-provider user id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: UserId,
    pub email: String,
    pub user_type: UserType,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    /// Sum of companion earnings credited by settled payments.
    pub total_earnings: Money,
    pub created_at: Timestamp,
}

impl Profile {
    /// Profile row written right after a successful sign-up.
    pub fn for_new_user(id: UserId, email: impl Into<String>, user_type: UserType) -> Self {
        Self {
            id,
            email: email.into(),
            user_type,
            display_name: None,
            avatar_url: None,
            total_earnings: Money::ZERO,
            created_at: Timestamp::now(),
        }
    }

    /// Public-facing subset used when listing bookings and conversations.
    pub fn summary(&self) -> ParticipantSummary {
        ParticipantSummary {
            id: self.id,
            display_name: self.display_name.clone(),
            avatar_url: self.avatar_url.clone(),
        }
    }
}

/// Display fields of the other party in a booking or conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantSummary {
    pub id: UserId,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
}
