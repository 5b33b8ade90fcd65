//! Identity adapters.
//!
//! Implementations of the `IdentityProvider` and `SessionValidator` ports:
//!
//! - `hosted` - GoTrue-compatible REST client for the hosted identity service
//! - `jwt` - local HS256 validation of provider-issued access tokens
//! - `mock` - test implementations that don't require external services

mod hosted;
mod jwt;
mod mock;

pub use hosted::{HostedIdentityConfig, HostedIdentityProvider};
pub use jwt::JwtSessionValidator;
pub use mock::{MockIdentityProvider, MockSessionValidator};
