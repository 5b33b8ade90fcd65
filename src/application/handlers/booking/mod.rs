//! Booking handlers.
//!
//! ## Commands
//! - Creating a booking (with payment authorization)
//! - Updating a booking's status
//! - Cancelling a booking
//!
//! ## Queries
//! - Listing the caller's bookings

mod cancel_booking;
mod create_booking;
mod list_bookings;
mod update_booking_status;

// Commands
pub use cancel_booking::{CancelBookingCommand, CancelBookingHandler, CancelBookingResult};
pub use create_booking::{CreateBookingCommand, CreateBookingHandler, CreateBookingResult};
pub use update_booking_status::{
    UpdateBookingStatusCommand, UpdateBookingStatusHandler, UpdateBookingStatusResult,
};

// Queries
pub use list_bookings::{ListBookingsHandler, ListBookingsQuery, ListBookingsResult};
