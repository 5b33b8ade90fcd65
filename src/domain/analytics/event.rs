//! Append-only behaviour events.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{EventId, Timestamp, UserId, ValidationError};

/// Event type recorded on every successful sign-in.
pub const LOGIN_EVENT: &str = "login";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BehaviorEvent {
    pub id: EventId,
    pub user_id: Option<UserId>,
    pub event_type: String,
    pub event_data: serde_json::Value,
    pub created_at: Timestamp,
}

impl BehaviorEvent {
    pub fn record(
        event_type: impl Into<String>,
        event_data: serde_json::Value,
        user_id: Option<UserId>,
    ) -> Result<Self, ValidationError> {
        let event_type = event_type.into();
        if event_type.trim().is_empty() {
            return Err(ValidationError::empty_field("event_type"));
        }
        Ok(Self {
            id: EventId::new(),
            user_id,
            event_type,
            event_data,
            created_at: Timestamp::now(),
        })
    }

    pub fn is_login(&self) -> bool {
        self.event_type == LOGIN_EVENT
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn record_rejects_blank_type() {
        assert!(BehaviorEvent::record("", json!({}), None).is_err());
    }

    #[test]
    fn record_keeps_payload_and_user() {
        let user = UserId::new();
        let event = BehaviorEvent::record("profile_view", json!({"companion": "x"}), Some(user))
            .unwrap();
        assert_eq!(event.user_id, Some(user));
        assert_eq!(event.event_data["companion"], "x");
        assert!(!event.is_login());
    }
}
