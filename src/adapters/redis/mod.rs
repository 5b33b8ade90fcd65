//! Redis adapters.
//!
//! The cache is only checked for the health report; no data lives there yet.

mod health_check;

pub use health_check::RedisHealthCheck;
