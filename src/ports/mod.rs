//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the application layer and the outside world. Adapters implement these ports.
//!
//! ## Identity
//!
//! - `IdentityProvider` - hosted sign-up, sign-in and password management
//! - `SessionValidator` - bearer token validation for every request
//!
//! ## Persistence
//!
//! - `ProfileRepository`, `BookingRepository`, `ConversationRepository`,
//!   `BehaviorRepository`
//!
//! ## External services
//!
//! - `PaymentGateway` - authorizations and refunds
//! - `MessageFeed` - live per-conversation message delivery
//! - `HealthCheck` - dependency checks for the health endpoint

mod behavior_repository;
mod booking_repository;
mod conversation_repository;
mod health_check;
mod identity_provider;
mod message_feed;
mod payment_gateway;
mod profile_repository;
mod session_validator;

pub use behavior_repository::BehaviorRepository;
pub use booking_repository::{BookingRepository, Settlement};
pub use conversation_repository::ConversationRepository;
pub use health_check::HealthCheck;
pub use identity_provider::{IdentityProvider, IdentityUser, Session, SignUpRequest};
pub use message_feed::{FeedSubscription, MessageFeed, SubscriberId};
pub use payment_gateway::{
    Authorization, AuthorizationRequest, AuthorizationStatus, GatewayError, GatewayErrorCode,
    PaymentGateway, Refund, RefundRequest,
};
pub use profile_repository::ProfileRepository;
pub use session_validator::SessionValidator;
