//! Analytics handlers.
//!
//! ## Commands
//! - Tracking a behaviour event
//!
//! ## Queries
//! - Dashboard metrics over a time window (admin)
//! - Engagement summary for one user (admin)

mod get_dashboard_metrics;
mod get_user_engagement;
mod track_event;

// Commands
pub use track_event::{TrackEventCommand, TrackEventHandler, TrackEventResult};

// Queries
pub use get_dashboard_metrics::{
    GetDashboardMetricsHandler, GetDashboardMetricsQuery, GetDashboardMetricsResult,
};
pub use get_user_engagement::{
    GetUserEngagementHandler, GetUserEngagementQuery, GetUserEngagementResult,
};
