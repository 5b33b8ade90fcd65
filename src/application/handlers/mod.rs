//! Application handlers.
//!
//! Command and query handlers that orchestrate domain operations, one
//! directory per component.

pub mod analytics;
pub mod booking;
pub mod identity;
pub mod messaging;
pub mod payment;

pub use analytics::{
    GetDashboardMetricsHandler, GetDashboardMetricsQuery, GetDashboardMetricsResult,
    GetUserEngagementHandler, GetUserEngagementQuery, GetUserEngagementResult, TrackEventCommand,
    TrackEventHandler, TrackEventResult,
};
pub use booking::{
    CancelBookingCommand, CancelBookingHandler, CancelBookingResult, CreateBookingCommand,
    CreateBookingHandler, CreateBookingResult, ListBookingsHandler, ListBookingsQuery,
    ListBookingsResult, UpdateBookingStatusCommand, UpdateBookingStatusHandler,
    UpdateBookingStatusResult,
};
pub use identity::{
    ChangePasswordCommand, ChangePasswordHandler, GetCurrentSessionHandler,
    GetCurrentSessionQuery, GetCurrentSessionResult, RegisterCommand, RegisterHandler,
    RegisterResult, RequestPasswordResetCommand, RequestPasswordResetHandler, SignInCommand,
    SignInHandler, SignInResult, SignOutCommand, SignOutHandler,
};
pub use messaging::{
    ListConversationsHandler, ListConversationsQuery, ListConversationsResult, LiveEvent,
    LiveSubscription, MarkReadCommand, MarkReadHandler, MarkReadResult, OpenConversationCommand,
    OpenConversationHandler, OpenConversationResult, SendMessageCommand, SendMessageHandler,
    SendMessageResult, SubscribeToConversationCommand, SubscribeToConversationHandler,
};
pub use payment::{
    AuthorizePaymentCommand, AuthorizePaymentHandler, AuthorizePaymentResult,
    ConfirmPaymentCommand, ConfirmPaymentHandler, ConfirmPaymentResult,
    HandleStripeWebhookCommand, HandleStripeWebhookHandler, HandleStripeWebhookResult,
    RefundPaymentCommand, RefundPaymentHandler, RefundPaymentResult,
};
