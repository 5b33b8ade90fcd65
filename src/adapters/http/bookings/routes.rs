//! HTTP routes for booking endpoints.

use axum::{
    routing::{post, put},
    Router,
};

use super::handlers::{
    cancel_booking, create_booking, list_bookings, update_booking_status, BookingHandlers,
};

/// Creates the booking router, mounted under `/api/bookings`.
pub fn booking_routes(handlers: BookingHandlers) -> Router {
    Router::new()
        .route("/", post(create_booking).get(list_bookings))
        .route("/:id/status", put(update_booking_status))
        .route("/:id/cancel", post(cancel_booking))
        .with_state(handlers)
}
