//! Payment domain module.
//!
//! - `errors` - PaymentError taxonomy
//! - `stripe_event` - webhook event payloads
//! - `webhook_verifier` - Stripe-Signature verification
//! - `webhook_errors` - webhook authentication failures

mod errors;
mod stripe_event;
mod webhook_errors;
mod webhook_verifier;

pub use errors::PaymentError;
pub use stripe_event::{PaymentIntentObject, StripeEvent, StripeEventData, StripeEventType};
pub use webhook_errors::WebhookError;
pub use webhook_verifier::{SignatureHeader, StripeWebhookVerifier};

#[cfg(test)]
pub use webhook_verifier::sign_for_test;
