//! In-memory persistence adapters.
//!
//! Back every repository port with process memory so handler and HTTP tests
//! run without PostgreSQL. Not intended for production use.

mod store;

pub use store::InMemoryStore;
