//! HTTP adapter for payment and webhook endpoints.

mod dto;
mod handlers;
mod routes;

pub use handlers::{PaymentHandlers, STRIPE_SIGNATURE_HEADER};
pub use routes::payment_routes;
