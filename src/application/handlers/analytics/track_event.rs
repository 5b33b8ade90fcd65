//! TrackEventHandler - Command handler for appending a behaviour event.

use std::sync::Arc;

use crate::domain::analytics::{AnalyticsError, BehaviorEvent};
use crate::domain::foundation::UserId;
use crate::ports::BehaviorRepository;

/// Command to record a behaviour event. Anonymous events carry no user.
#[derive(Debug, Clone)]
pub struct TrackEventCommand {
    pub event_type: String,
    pub event_data: serde_json::Value,
    pub user_id: Option<UserId>,
}

#[derive(Debug, Clone)]
pub struct TrackEventResult {
    pub event: BehaviorEvent,
}

pub struct TrackEventHandler {
    events: Arc<dyn BehaviorRepository>,
}

impl TrackEventHandler {
    pub fn new(events: Arc<dyn BehaviorRepository>) -> Self {
        Self { events }
    }

    pub async fn handle(&self, cmd: TrackEventCommand) -> Result<TrackEventResult, AnalyticsError> {
        let event = BehaviorEvent::record(cmd.event_type, cmd.event_data, cmd.user_id)?;
        self.events.append(&event).await?;
        Ok(TrackEventResult { event })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryStore;
    use serde_json::json;

    #[tokio::test]
    async fn appends_event() {
        let store = InMemoryStore::new();
        let handler = TrackEventHandler::new(Arc::new(store.clone()));
        let user = UserId::new();

        let result = handler
            .handle(TrackEventCommand {
                event_type: "profile_view".to_string(),
                event_data: json!({"companion_id": "c-1"}),
                user_id: Some(user),
            })
            .await
            .unwrap();

        let stored = store.events();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0], result.event);
        assert_eq!(stored[0].user_id, Some(user));
    }

    #[tokio::test]
    async fn blank_event_type_is_rejected() {
        let store = InMemoryStore::new();
        let handler = TrackEventHandler::new(Arc::new(store.clone()));

        let err = handler
            .handle(TrackEventCommand {
                event_type: " ".to_string(),
                event_data: json!({}),
                user_id: None,
            })
            .await
            .unwrap_err();

        assert!(matches!(err, AnalyticsError::ValidationFailed { .. }));
        assert!(store.events().is_empty());
    }

    #[tokio::test]
    async fn storage_failure_propagates() {
        let store = InMemoryStore::new();
        store.fail_writes_to("user_behavior");
        let handler = TrackEventHandler::new(Arc::new(store));

        let err = handler
            .handle(TrackEventCommand {
                event_type: "search".to_string(),
                event_data: json!({}),
                user_id: None,
            })
            .await
            .unwrap_err();

        assert!(matches!(err, AnalyticsError::Infrastructure(_)));
    }
}
