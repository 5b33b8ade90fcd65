//! Application router: wires ports into handlers and mounts every module.
//!
//! ```text
//! /health                         health check
//! /api/auth/*                     identity
//! /api/bookings/*                 bookings
//! /api/payments/*, /api/webhooks  payments
//! /api/conversations/*            messaging + live socket
//! /api/analytics/*                analytics
//! everything else                 page gateway (redirect or 404)
//! ```

use std::sync::Arc;
use std::time::Duration;

use axum::{
    http::{header, HeaderName, HeaderValue, Method},
    middleware, Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::application::handlers::analytics::{
    GetDashboardMetricsHandler, GetUserEngagementHandler, TrackEventHandler,
};
use crate::application::handlers::booking::{
    CancelBookingHandler, CreateBookingHandler, ListBookingsHandler, UpdateBookingStatusHandler,
};
use crate::application::handlers::identity::{
    ChangePasswordHandler, GetCurrentSessionHandler, RegisterHandler,
    RequestPasswordResetHandler, SignInHandler, SignOutHandler,
};
use crate::application::handlers::messaging::{
    ListConversationsHandler, MarkReadHandler, OpenConversationHandler, SendMessageHandler,
    SubscribeToConversationHandler,
};
use crate::application::handlers::payment::{
    AuthorizePaymentHandler, ConfirmPaymentHandler, HandleStripeWebhookHandler,
    RefundPaymentHandler,
};
use crate::adapters::websocket::{live_routes, WebSocketState};
use crate::config::AppConfig;
use crate::domain::payment::StripeWebhookVerifier;
use crate::ports::{
    BehaviorRepository, BookingRepository, ConversationRepository, HealthCheck, IdentityProvider,
    MessageFeed, PaymentGateway, ProfileRepository, SessionValidator,
};

use super::analytics::{analytics_routes, AnalyticsHandlers};
use super::bookings::{booking_routes, BookingHandlers};
use super::health::{health_routes, HealthState};
use super::identity::{identity_routes, IdentityHandlers};
use super::messaging::{messaging_routes, MessagingHandlers};
use super::middleware::{auth_middleware, route_guard, AuthState};
use super::payments::{payment_routes, PaymentHandlers};

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Adapters the application runs against.
#[derive(Clone)]
pub struct AppPorts {
    pub identity: Arc<dyn IdentityProvider>,
    pub sessions: Arc<dyn SessionValidator>,
    pub profiles: Arc<dyn ProfileRepository>,
    pub bookings: Arc<dyn BookingRepository>,
    pub conversations: Arc<dyn ConversationRepository>,
    pub events: Arc<dyn BehaviorRepository>,
    pub gateway: Arc<dyn PaymentGateway>,
    pub feed: Arc<dyn MessageFeed>,
    pub database_check: Arc<dyn HealthCheck>,
    pub cache_check: Option<Arc<dyn HealthCheck>>,
}

/// Values the router and handlers need from configuration.
#[derive(Debug, Clone)]
pub struct AppSettings {
    pub currency: String,
    pub password_reset_url: String,
    pub webhook_secret: String,
    pub require_livemode: bool,
    pub cors_origins: Vec<String>,
    pub request_timeout: Duration,
}

impl AppSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            currency: config.payment.currency.clone(),
            password_reset_url: config.server.password_reset_url(),
            webhook_secret: config.payment.stripe_webhook_secret.clone(),
            require_livemode: config.payment.require_livemode,
            cors_origins: config.server.cors_origins_list(),
            request_timeout: config.server.request_timeout(),
        }
    }
}

/// Every module's handler set, ready to mount.
#[derive(Clone)]
pub struct AppState {
    pub identity: IdentityHandlers,
    pub bookings: BookingHandlers,
    pub payments: PaymentHandlers,
    pub messaging: MessagingHandlers,
    pub live: WebSocketState,
    pub analytics: AnalyticsHandlers,
    pub health: HealthState,
    pub auth: AuthState,
}

impl AppState {
    /// Builds all application handlers over the given ports.
    pub fn wire(ports: AppPorts, settings: &AppSettings) -> Self {
        let track_event = Arc::new(TrackEventHandler::new(ports.events.clone()));

        let identity = IdentityHandlers {
            register: Arc::new(RegisterHandler::new(
                ports.identity.clone(),
                ports.profiles.clone(),
            )),
            sign_in: Arc::new(SignInHandler::new(ports.identity.clone())),
            sign_out: Arc::new(SignOutHandler::new(ports.identity.clone())),
            request_password_reset: Arc::new(RequestPasswordResetHandler::new(
                ports.identity.clone(),
                settings.password_reset_url.clone(),
            )),
            change_password: Arc::new(ChangePasswordHandler::new(ports.identity.clone())),
            current_session: Arc::new(GetCurrentSessionHandler::new(ports.identity.clone())),
            track_event: track_event.clone(),
        };

        let authorize = Arc::new(AuthorizePaymentHandler::new(
            ports.bookings.clone(),
            ports.gateway.clone(),
            settings.currency.clone(),
        ));
        let bookings = BookingHandlers {
            create: Arc::new(CreateBookingHandler::new(
                ports.profiles.clone(),
                ports.bookings.clone(),
                authorize,
            )),
            list: Arc::new(ListBookingsHandler::new(
                ports.bookings.clone(),
                ports.profiles.clone(),
            )),
            update_status: Arc::new(UpdateBookingStatusHandler::new(ports.bookings.clone())),
            cancel: Arc::new(CancelBookingHandler::new(ports.bookings.clone())),
        };

        let confirm = Arc::new(ConfirmPaymentHandler::new(
            ports.bookings.clone(),
            ports.gateway.clone(),
        ));
        let payments = PaymentHandlers {
            confirm: confirm.clone(),
            refund: Arc::new(RefundPaymentHandler::new(
                ports.bookings.clone(),
                ports.gateway.clone(),
            )),
            webhook: Arc::new(HandleStripeWebhookHandler::new(
                StripeWebhookVerifier::new(settings.webhook_secret.clone()),
                confirm,
                settings.require_livemode,
            )),
        };

        let messaging = MessagingHandlers {
            open: Arc::new(OpenConversationHandler::new(
                ports.conversations.clone(),
                ports.profiles.clone(),
            )),
            list: Arc::new(ListConversationsHandler::new(
                ports.conversations.clone(),
                ports.profiles.clone(),
            )),
            send: Arc::new(SendMessageHandler::new(
                ports.conversations.clone(),
                ports.feed.clone(),
            )),
            mark_read: Arc::new(MarkReadHandler::new(ports.conversations.clone())),
        };
        let live = WebSocketState::new(Arc::new(SubscribeToConversationHandler::new(
            ports.conversations.clone(),
            ports.feed.clone(),
        )));

        let analytics = AnalyticsHandlers {
            track: track_event,
            dashboard: Arc::new(GetDashboardMetricsHandler::new(
                ports.events.clone(),
                ports.bookings.clone(),
            )),
            engagement: Arc::new(GetUserEngagementHandler::new(ports.events.clone())),
        };

        Self {
            identity,
            bookings,
            payments,
            messaging,
            live,
            analytics,
            health: HealthState {
                database: ports.database_check,
                cache: ports.cache_check,
            },
            auth: ports.sessions,
        }
    }
}

/// Mounts every module and applies the shared middleware stack.
pub fn build_router(state: AppState, settings: &AppSettings) -> Router {
    let conversations = messaging_routes(state.messaging).merge(live_routes(state.live));

    Router::new()
        .merge(health_routes(state.health))
        .nest("/api/auth", identity_routes(state.identity))
        .nest("/api/bookings", booking_routes(state.bookings))
        .merge(payment_routes(state.payments))
        .nest("/api/conversations", conversations)
        .nest("/api/analytics", analytics_routes(state.analytics))
        // Inner to outer: session lookup, page gateway, compression, timeout,
        // cors, tracing, request id
        .layer(middleware::from_fn_with_state(
            state.auth.clone(),
            auth_middleware,
        ))
        .layer(middleware::from_fn_with_state(state.auth, route_guard))
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(settings.request_timeout))
        .layer(cors_layer(&settings.cors_origins))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
            REQUEST_ID_HEADER,
        )))
        .layer(SetRequestIdLayer::new(
            HeaderName::from_static(REQUEST_ID_HEADER),
            MakeRequestUuid,
        ))
}

/// Credentialed CORS for the configured front-end origins.
///
/// An empty list allows no cross-origin callers.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    if allowed.is_empty() {
        return CorsLayer::new();
    }

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            HeaderName::from_static("stripe-signature"),
        ])
        .allow_credentials(true)
}
