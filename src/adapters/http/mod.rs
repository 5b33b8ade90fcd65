//! HTTP adapters - REST API implementations.
//!
//! Each module has its own HTTP adapter (dto, handlers, routes) and the
//! router mounts them under `/api` with the shared middleware stack.

pub mod analytics;
pub mod bookings;
pub mod dto;
pub mod error;
pub mod health;
pub mod identity;
pub mod messaging;
pub mod middleware;
pub mod payments;
pub mod router;

// Re-export key types for convenience
pub use error::{ApiError, ErrorResponse};
pub use health::HealthState;
pub use router::{build_router, AppPorts, AppSettings, AppState};
