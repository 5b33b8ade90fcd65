//! Strongly-typed identifier value objects.
//!
//! Every entity in the marketplace is keyed by a UUID. User ids are issued by the
//! identity provider and reused verbatim as profile ids.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Creates a new random identifier.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Wraps an existing UUID.
            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the inner UUID.
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(Uuid::parse_str(s)?))
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }
    };
}

uuid_id!(
    /// Identity-provider user id; doubles as the profile id.
    UserId
);

uuid_id!(
    /// Unique identifier for a booking.
    BookingId
);

uuid_id!(
    /// Unique identifier for a two-party conversation.
    ConversationId
);

uuid_id!(
    /// Unique identifier for a message.
    MessageId
);

uuid_id!(
    /// Unique identifier for a recorded behaviour event.
    EventId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn booking_id_generates_unique_values() {
        assert_ne!(BookingId::new(), BookingId::new());
    }

    #[test]
    fn user_id_parses_from_valid_string() {
        let uuid_str = "550e8400-e29b-41d4-a716-446655440000";
        let id: UserId = uuid_str.parse().unwrap();
        assert_eq!(id.to_string(), uuid_str);
    }

    #[test]
    fn user_id_rejects_garbage() {
        assert!("user-123".parse::<UserId>().is_err());
    }

    #[test]
    fn conversation_id_from_uuid_preserves_value() {
        let uuid = Uuid::new_v4();
        let id = ConversationId::from_uuid(uuid);
        assert_eq!(id.as_uuid(), &uuid);
    }

    #[test]
    fn message_id_serializes_transparently() {
        let uuid_str = "550e8400-e29b-41d4-a716-446655440000";
        let id: MessageId = uuid_str.parse().unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", uuid_str));
    }
}
