//! DTOs shared by several endpoint groups.

use serde::Serialize;

use crate::domain::profile::ParticipantSummary;

/// Public view of the other party in a booking or conversation.
#[derive(Debug, Clone, Serialize)]
pub struct ParticipantResponse {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

impl From<ParticipantSummary> for ParticipantResponse {
    fn from(p: ParticipantSummary) -> Self {
        Self {
            id: p.id.to_string(),
            display_name: p.display_name,
            avatar_url: p.avatar_url,
        }
    }
}
