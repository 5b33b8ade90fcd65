//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `auth` - Hosted identity provider, JWT session validation, mocks
//! - `http` - REST API and the page gateway
//! - `memory` - In-memory repositories for tests and local runs
//! - `postgres` - PostgreSQL repositories
//! - `redis` - Cache health check
//! - `stripe` - Stripe payment gateway
//! - `websocket` - Live conversation rooms and socket handler

pub mod auth;
pub mod http;
pub mod memory;
pub mod postgres;
pub mod redis;
pub mod stripe;
pub mod websocket;
