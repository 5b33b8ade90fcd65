//! Booking domain module.
//!
//! - `aggregate` - Booking entity and its lifecycle operations
//! - `status` - BookingStatus state machine and PaymentStatus
//! - `pricing` - hourly pricing and the platform fee split
//! - `errors` - BookingError taxonomy

mod aggregate;
mod errors;
mod pricing;
mod status;

pub use aggregate::{Booking, BookingRequest, BookingWithParties, AUTHORIZATION_FAILED_REASON};
pub use errors::BookingError;
pub use pricing::{DurationHours, FeeSplit, PLATFORM_FEE_RATE};
pub use status::{BookingStatus, PaymentStatus};
