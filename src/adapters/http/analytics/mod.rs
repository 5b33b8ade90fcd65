//! HTTP adapter for analytics endpoints.

mod dto;
mod handlers;
mod routes;

pub use handlers::AnalyticsHandlers;
pub use routes::analytics_routes;
