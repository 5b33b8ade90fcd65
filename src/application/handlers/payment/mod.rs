//! Payment handlers.
//!
//! ## Commands
//! - Authorizing a booking's payment with the gateway
//! - Confirming a succeeded authorization (settlement)
//! - Refunding a settled booking (admin)
//! - Processing Stripe webhook deliveries

mod authorize_payment;
mod confirm_payment;
mod handle_stripe_webhook;
mod refund_payment;

// Commands
pub use authorize_payment::{AuthorizePaymentCommand, AuthorizePaymentHandler, AuthorizePaymentResult};
pub use confirm_payment::{ConfirmPaymentCommand, ConfirmPaymentHandler, ConfirmPaymentResult};
pub use handle_stripe_webhook::{
    HandleStripeWebhookCommand, HandleStripeWebhookHandler, HandleStripeWebhookResult,
};
pub use refund_payment::{RefundPaymentCommand, RefundPaymentHandler, RefundPaymentResult};
