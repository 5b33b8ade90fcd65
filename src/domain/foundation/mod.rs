//! Foundation value objects shared by every marketplace component.

mod auth;
mod errors;
mod ids;
mod money;
mod percentage;
mod state_machine;
mod timestamp;
mod user_type;

pub use auth::{AuthError, AuthenticatedUser};
pub use errors::{DomainError, ErrorCode, ValidationError};
pub use ids::{BookingId, ConversationId, EventId, MessageId, UserId};
pub use money::Money;
pub use percentage::Percentage;
pub use state_machine::StateMachine;
pub use timestamp::Timestamp;
pub use user_type::UserType;
