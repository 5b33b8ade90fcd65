//! Companion Market - booking marketplace backend
//!
//! Clients book companions by the hour, pay through Stripe, message each
//! other in real time, and admins watch platform metrics.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
