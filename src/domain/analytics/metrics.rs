//! Dashboard and engagement aggregation over fetched rows.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

use crate::domain::booking::{Booking, BookingStatus};
use crate::domain::foundation::{Money, Timestamp};

use super::BehaviorEvent;

/// Page size for the engagement summary.
pub const ENGAGEMENT_PAGE_SIZE: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserMetrics {
    /// Distinct users with at least one event in the window.
    pub total: usize,
    /// Number of `login` events in the window.
    pub active: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingMetrics {
    pub total: usize,
    pub completed: usize,
    /// Sum of `total_amount` over paid bookings.
    pub revenue: Money,
    /// Sum of `platform_fee` over paid bookings.
    pub platform_fees: Money,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardMetrics {
    pub since: Timestamp,
    pub users: UserMetrics,
    pub bookings: BookingMetrics,
}

impl DashboardMetrics {
    /// Aggregates the rows created since `since`.
    pub fn aggregate(
        since: Timestamp,
        events: &[BehaviorEvent],
        bookings: &[Booking],
        paid_bookings: &[Booking],
    ) -> Self {
        let distinct_users: HashSet<_> = events.iter().filter_map(|e| e.user_id).collect();

        Self {
            since,
            users: UserMetrics {
                total: distinct_users.len(),
                active: events.iter().filter(|e| e.is_login()).count(),
            },
            bookings: BookingMetrics {
                total: bookings.len(),
                completed: bookings
                    .iter()
                    .filter(|b| b.status == BookingStatus::Completed)
                    .count(),
                revenue: paid_bookings.iter().map(|b| b.total_amount).sum(),
                platform_fees: paid_bookings.iter().map(|b| b.platform_fee).sum(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserEngagement {
    pub last_activity: Option<Timestamp>,
    pub total_events: usize,
    pub event_types: BTreeMap<String, usize>,
}

impl UserEngagement {
    /// Summarises a newest-first page of a user's events.
    pub fn from_recent(events: &[BehaviorEvent]) -> Self {
        let mut event_types = BTreeMap::new();
        for event in events {
            *event_types.entry(event.event_type.clone()).or_insert(0) += 1;
        }
        Self {
            last_activity: events.first().map(|e| e.created_at),
            total_events: events.len(),
            event_types,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::booking::{BookingRequest, DurationHours};
    use crate::domain::foundation::UserId;
    use serde_json::json;

    fn event(kind: &str, user: Option<UserId>) -> BehaviorEvent {
        BehaviorEvent::record(kind, json!({}), user).unwrap()
    }

    fn booking(rate_cents: i64) -> Booking {
        Booking::create(
            BookingRequest {
                client_id: UserId::new(),
                companion_id: UserId::new(),
                start_time: Timestamp::now(),
                duration: DurationHours::try_new(1).unwrap(),
                service_type: "coffee".to_string(),
                location: None,
                special_requests: None,
            },
            Money::from_cents(rate_cents),
        )
        .unwrap()
    }

    #[test]
    fn dashboard_counts_distinct_users_and_logins() {
        let a = UserId::new();
        let b = UserId::new();
        let events = vec![
            event("login", Some(a)),
            event("login", Some(a)),
            event("search", Some(b)),
            event("page_view", None),
        ];

        let metrics = DashboardMetrics::aggregate(Timestamp::now(), &events, &[], &[]);

        assert_eq!(metrics.users.total, 2);
        assert_eq!(metrics.users.active, 2);
    }

    #[test]
    fn dashboard_sums_paid_revenue_and_fees() {
        let mut done = booking(10_000);
        done.status = BookingStatus::Completed;
        let pending = booking(5_000);
        let paid = vec![done.clone()];

        let metrics =
            DashboardMetrics::aggregate(Timestamp::now(), &[], &[done, pending], &paid);

        assert_eq!(metrics.bookings.total, 2);
        assert_eq!(metrics.bookings.completed, 1);
        assert_eq!(metrics.bookings.revenue, Money::from_cents(10_000));
        assert_eq!(metrics.bookings.platform_fees, Money::from_cents(1_500));
    }

    #[test]
    fn engagement_counts_event_types_and_takes_newest_activity() {
        let user = Some(UserId::new());
        let events = vec![event("login", user), event("search", user), event("login", user)];

        let engagement = UserEngagement::from_recent(&events);

        assert_eq!(engagement.total_events, 3);
        assert_eq!(engagement.last_activity, Some(events[0].created_at));
        assert_eq!(engagement.event_types.get("login"), Some(&2));
        assert_eq!(engagement.event_types.get("search"), Some(&1));
    }

    #[test]
    fn engagement_of_no_events_is_empty() {
        let engagement = UserEngagement::from_recent(&[]);
        assert_eq!(engagement.total_events, 0);
        assert!(engagement.last_activity.is_none());
        assert!(engagement.event_types.is_empty());
    }
}
