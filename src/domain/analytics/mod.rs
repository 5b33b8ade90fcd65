//! Analytics domain module.
//!
//! - `event` - append-only behaviour events
//! - `time_range` - strict `<N>d` / `<N>w` / `<N>` window parsing
//! - `metrics` - dashboard and engagement aggregation
//! - `errors` - AnalyticsError taxonomy

mod errors;
mod event;
mod metrics;
mod time_range;

pub use errors::AnalyticsError;
pub use event::{BehaviorEvent, LOGIN_EVENT};
pub use metrics::{
    BookingMetrics, DashboardMetrics, UserEngagement, UserMetrics, ENGAGEMENT_PAGE_SIZE,
};
pub use time_range::TimeRange;
