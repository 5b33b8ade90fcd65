//! Shared harness: the full router over in-memory adapters.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use tower::ServiceExt;

use companion_market::adapters::auth::{MockIdentityProvider, MockSessionValidator};
use companion_market::adapters::http::{build_router, AppPorts, AppSettings, AppState};
use companion_market::adapters::memory::InMemoryStore;
use companion_market::adapters::stripe::MockPaymentGateway;
use companion_market::adapters::websocket::ConversationRooms;
use companion_market::domain::foundation::{AuthenticatedUser, DomainError, UserId, UserType};
use companion_market::ports::{HealthCheck, SessionValidator};

pub const WEBHOOK_SECRET: &str = "whsec_integration";

struct UpCheck;

#[async_trait]
impl HealthCheck for UpCheck {
    fn name(&self) -> &'static str {
        "database"
    }

    async fn check(&self) -> Result<(), DomainError> {
        Ok(())
    }
}

pub struct TestApp {
    pub router: Router,
    pub store: InMemoryStore,
    pub gateway: MockPaymentGateway,
    pub identity: Arc<MockIdentityProvider>,
    pub sessions: Arc<MockSessionValidator>,
    pub rooms: Arc<ConversationRooms>,
}

impl TestApp {
    /// Router whose bearer tokens come from the seeded session table.
    pub fn new() -> Self {
        let sessions = Arc::new(MockSessionValidator::new());
        Self::build_with(Arc::new(MockIdentityProvider::new()), sessions.clone(), sessions)
    }

    /// Router whose bearer tokens are issued by the identity provider's sign-in.
    pub fn with_identity_sessions() -> Self {
        let identity = Arc::new(MockIdentityProvider::new());
        Self::build_with(identity.clone(), identity, Arc::new(MockSessionValidator::new()))
    }

    fn build_with(
        identity: Arc<MockIdentityProvider>,
        validator: Arc<dyn SessionValidator>,
        sessions: Arc<MockSessionValidator>,
    ) -> Self {
        let store = InMemoryStore::new();
        let gateway = MockPaymentGateway::new();
        let rooms = Arc::new(ConversationRooms::default());

        let ports = AppPorts {
            identity: identity.clone(),
            sessions: validator,
            profiles: Arc::new(store.clone()),
            bookings: Arc::new(store.clone()),
            conversations: Arc::new(store.clone()),
            events: Arc::new(store.clone()),
            gateway: Arc::new(gateway.clone()),
            feed: rooms.clone(),
            database_check: Arc::new(UpCheck),
            cache_check: None,
        };
        let settings = AppSettings {
            currency: "usd".to_string(),
            password_reset_url: "http://localhost:3000/reset-password".to_string(),
            webhook_secret: WEBHOOK_SECRET.to_string(),
            require_livemode: false,
            cors_origins: Vec::new(),
            request_timeout: Duration::from_secs(10),
        };

        Self {
            router: build_router(AppState::wire(ports, &settings), &settings),
            store,
            gateway,
            identity,
            sessions,
            rooms,
        }
    }

    /// Seeds a client profile and a bearer token for it.
    pub fn client(&self, email: &str, token: &str) -> UserId {
        let id = self.store.seed_client(email);
        self.sessions
            .add_token(token, AuthenticatedUser::new(id, email, UserType::Client));
        id
    }

    /// Seeds a companion profile with an hourly rate in cents and a token.
    pub fn companion(&self, email: &str, token: &str, rate_cents: i64) -> UserId {
        let id = self.store.seed_companion(
            email,
            companion_market::domain::foundation::Money::from_cents(rate_cents),
        );
        self.sessions
            .add_token(token, AuthenticatedUser::new(id, email, UserType::Companion));
        id
    }

    pub fn admin(&self, token: &str) -> UserId {
        self.sessions.add_test_user(token, UserType::Admin)
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, serde_json::Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = if body.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&body).unwrap()
        };
        (status, json)
    }

    pub async fn get(&self, uri: &str, token: &str) -> (StatusCode, serde_json::Value) {
        self.send(
            Request::builder()
                .method("GET")
                .uri(uri)
                .header("authorization", format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }

    pub async fn post(
        &self,
        uri: &str,
        token: Option<&str>,
        body: serde_json::Value,
    ) -> (StatusCode, serde_json::Value) {
        self.json_request("POST", uri, token, body).await
    }

    pub async fn put(
        &self,
        uri: &str,
        token: Option<&str>,
        body: serde_json::Value,
    ) -> (StatusCode, serde_json::Value) {
        self.json_request("PUT", uri, token, body).await
    }

    async fn json_request(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: serde_json::Value,
    ) -> (StatusCode, serde_json::Value) {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json");
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {}", token));
        }
        self.send(builder.body(Body::from(body.to_string())).unwrap())
            .await
    }

    /// Delivers a correctly signed webhook.
    pub async fn webhook(&self, payload: &str) -> (StatusCode, serde_json::Value) {
        let timestamp = chrono::Utc::now().timestamp();
        self.send(
            Request::builder()
                .method("POST")
                .uri("/api/webhooks/stripe")
                .header("stripe-signature", stripe_signature(WEBHOOK_SECRET, timestamp, payload))
                .body(Body::from(payload.to_string()))
                .unwrap(),
        )
        .await
    }
}

/// `Stripe-Signature` header value for `payload`.
pub fn stripe_signature(secret: &str, timestamp: i64, payload: &str) -> String {
    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes()).unwrap();
    mac.update(format!("{}.{}", timestamp, payload).as_bytes());
    format!("t={},v1={}", timestamp, hex::encode(mac.finalize().into_bytes()))
}

pub fn payment_succeeded_event(event_id: &str, intent_id: &str) -> String {
    serde_json::json!({
        "id": event_id,
        "type": "payment_intent.succeeded",
        "created": chrono::Utc::now().timestamp(),
        "livemode": false,
        "data": { "object": { "id": intent_id, "status": "succeeded" } }
    })
    .to_string()
}
