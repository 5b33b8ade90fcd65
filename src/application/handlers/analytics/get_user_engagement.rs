//! GetUserEngagementHandler - Admin query handler for one user's recent activity.

use std::sync::Arc;

use crate::domain::analytics::{AnalyticsError, UserEngagement, ENGAGEMENT_PAGE_SIZE};
use crate::domain::foundation::{AuthenticatedUser, UserId};
use crate::ports::BehaviorRepository;

#[derive(Debug, Clone)]
pub struct GetUserEngagementQuery {
    pub caller: Option<AuthenticatedUser>,
    pub user_id: UserId,
}

#[derive(Debug, Clone)]
pub struct GetUserEngagementResult {
    pub engagement: UserEngagement,
}

/// Handler summarising the user's last [`ENGAGEMENT_PAGE_SIZE`] events.
pub struct GetUserEngagementHandler {
    events: Arc<dyn BehaviorRepository>,
}

impl GetUserEngagementHandler {
    pub fn new(events: Arc<dyn BehaviorRepository>) -> Self {
        Self { events }
    }

    pub async fn handle(
        &self,
        query: GetUserEngagementQuery,
    ) -> Result<GetUserEngagementResult, AnalyticsError> {
        let caller = query.caller.ok_or(AnalyticsError::NotAuthenticated)?;
        if !caller.is_admin() {
            return Err(AnalyticsError::Forbidden);
        }

        let recent = self
            .events
            .recent_for_user(&query.user_id, ENGAGEMENT_PAGE_SIZE)
            .await?;

        Ok(GetUserEngagementResult {
            engagement: UserEngagement::from_recent(&recent),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryStore;
    use crate::domain::analytics::BehaviorEvent;
    use crate::domain::foundation::UserType;
    use serde_json::json;

    fn admin() -> Option<AuthenticatedUser> {
        Some(AuthenticatedUser::new(UserId::new(), "ops@example.com", UserType::Admin))
    }

    #[tokio::test]
    async fn summarises_at_most_one_page() {
        let store = InMemoryStore::new();
        let user = UserId::new();
        for i in 0..(ENGAGEMENT_PAGE_SIZE + 20) {
            let kind = if i % 2 == 0 { "search" } else { "profile_view" };
            store
                .append(&BehaviorEvent::record(kind, json!({}), Some(user)).unwrap())
                .await
                .unwrap();
        }
        let last = BehaviorEvent::record("login", json!({}), Some(user)).unwrap();
        store.append(&last).await.unwrap();
        store
            .append(&BehaviorEvent::record("search", json!({}), Some(UserId::new())).unwrap())
            .await
            .unwrap();

        let result = GetUserEngagementHandler::new(Arc::new(store))
            .handle(GetUserEngagementQuery {
                caller: admin(),
                user_id: user,
            })
            .await
            .unwrap();

        let engagement = result.engagement;
        assert_eq!(engagement.total_events, ENGAGEMENT_PAGE_SIZE);
        assert_eq!(engagement.last_activity, Some(last.created_at));
        assert_eq!(engagement.event_types.get("login"), Some(&1));
        assert_eq!(engagement.event_types.values().sum::<usize>(), ENGAGEMENT_PAGE_SIZE);
    }

    #[tokio::test]
    async fn user_without_events_has_empty_summary() {
        let store = InMemoryStore::new();

        let result = GetUserEngagementHandler::new(Arc::new(store))
            .handle(GetUserEngagementQuery {
                caller: admin(),
                user_id: UserId::new(),
            })
            .await
            .unwrap();

        assert_eq!(result.engagement.total_events, 0);
        assert!(result.engagement.last_activity.is_none());
    }

    #[tokio::test]
    async fn missing_caller_is_not_authenticated() {
        let store = InMemoryStore::new();

        let err = GetUserEngagementHandler::new(Arc::new(store))
            .handle(GetUserEngagementQuery {
                caller: None,
                user_id: UserId::new(),
            })
            .await
            .unwrap_err();

        assert_eq!(err, AnalyticsError::NotAuthenticated);
    }
}
