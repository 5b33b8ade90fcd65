//! GetDashboardMetricsHandler - Admin query handler for marketplace totals.

use std::sync::Arc;

use crate::domain::analytics::{AnalyticsError, DashboardMetrics, TimeRange};
use crate::domain::booking::PaymentStatus;
use crate::domain::foundation::{AuthenticatedUser, Timestamp};
use crate::ports::{BehaviorRepository, BookingRepository};

#[derive(Debug, Clone)]
pub struct GetDashboardMetricsQuery {
    pub caller: Option<AuthenticatedUser>,
    /// `<N>d`, `<N>w` or `<N>`; defaults to 30 days.
    pub time_range: Option<String>,
}

#[derive(Debug, Clone)]
pub struct GetDashboardMetricsResult {
    pub time_range: TimeRange,
    pub metrics: DashboardMetrics,
}

/// Handler for the admin dashboard.
///
/// Aggregation happens in-process over the rows created since the window
/// start.
pub struct GetDashboardMetricsHandler {
    events: Arc<dyn BehaviorRepository>,
    bookings: Arc<dyn BookingRepository>,
}

impl GetDashboardMetricsHandler {
    pub fn new(events: Arc<dyn BehaviorRepository>, bookings: Arc<dyn BookingRepository>) -> Self {
        Self { events, bookings }
    }

    pub async fn handle(
        &self,
        query: GetDashboardMetricsQuery,
    ) -> Result<GetDashboardMetricsResult, AnalyticsError> {
        let caller = query.caller.ok_or(AnalyticsError::NotAuthenticated)?;
        if !caller.is_admin() {
            return Err(AnalyticsError::Forbidden);
        }

        let time_range = match query.time_range.as_deref() {
            Some(raw) => raw.parse::<TimeRange>()?,
            None => TimeRange::default(),
        };
        let since = time_range.start_from(Timestamp::now());

        let events = self.events.created_since(since).await?;
        let bookings = self.bookings.list_created_since(since, None).await?;
        let paid = self
            .bookings
            .list_created_since(since, Some(PaymentStatus::Paid))
            .await?;

        Ok(GetDashboardMetricsResult {
            time_range,
            metrics: DashboardMetrics::aggregate(since, &events, &bookings, &paid),
        })
    }
}
