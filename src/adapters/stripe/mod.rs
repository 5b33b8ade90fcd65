//! Stripe payment gateway adapter.
//!
//! Implements the `PaymentGateway` port against Stripe PaymentIntents and
//! Refunds, plus an in-process mock for tests.
//!
//! Webhook signature verification lives with the payment domain
//! (`domain::payment::StripeWebhookVerifier`) since it needs no network.

mod api_types;
mod mock_payment_gateway;
mod stripe_adapter;

pub use api_types::{StripeApiError, StripeErrorEnvelope, StripePaymentIntent, StripeRefund};
pub use mock_payment_gateway::{MethodCall, MockPaymentGateway};
pub use stripe_adapter::{StripeConfig, StripePaymentGateway};
