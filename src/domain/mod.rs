//! Domain layer: marketplace types and rules with no I/O.

pub mod analytics;
pub mod booking;
pub mod foundation;
pub mod messaging;
pub mod payment;
pub mod profile;
