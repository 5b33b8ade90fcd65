//! WebSocket upgrade handler for live conversation delivery.
//!
//! Handles the HTTP → WebSocket upgrade and manages the connection lifecycle:
//! 1. Authenticate and open the subscription (errors are plain HTTP responses)
//! 2. Upgrade to WebSocket
//! 3. Send `connected`, then the backfill, then live messages
//! 4. Answer pings until either side goes away
//! 5. Release the subscription

use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message as WsMessage, WebSocket, WebSocketUpgrade},
        Path, Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use futures::{stream::SplitSink, SinkExt, StreamExt};
use serde::Deserialize;

use crate::adapters::http::error::{ApiError, ErrorResponse};
use crate::adapters::http::messaging::parse_conversation_id;
use crate::adapters::http::middleware::RequireAuth;
use crate::application::handlers::messaging::{
    LiveSubscription, SubscribeToConversationCommand, SubscribeToConversationHandler,
};
use crate::domain::foundation::{ConversationId, MessageId};

use super::messages::{now_rfc3339, ClientMessage, ConnectedMessage, ServerMessage};

/// State required for WebSocket handling.
#[derive(Clone)]
pub struct WebSocketState {
    pub subscriptions: Arc<SubscribeToConversationHandler>,
}

impl WebSocketState {
    pub fn new(subscriptions: Arc<SubscribeToConversationHandler>) -> Self {
        Self { subscriptions }
    }
}

#[derive(Debug, Deserialize)]
pub struct LiveQuery {
    /// Last message id the client has seen.
    #[serde(default)]
    pub after: Option<String>,
}

/// Creates the live router, merged under `/api/conversations`.
pub fn live_routes(state: WebSocketState) -> Router {
    Router::new()
        .route("/:id/live", get(ws_handler))
        .with_state(state)
}

/// Handle WebSocket upgrade requests for a conversation.
///
/// Route: `GET /api/conversations/:id/live?after=<message id>`
///
/// The subscription is opened before the upgrade so authorization and
/// resume-token failures come back as ordinary HTTP errors. A plain GET that
/// passes those checks gets 426.
pub async fn ws_handler(
    State(state): State<WebSocketState>,
    RequireAuth(user): RequireAuth,
    Path(conversation_id): Path<String>,
    Query(query): Query<LiveQuery>,
    ws: Option<WebSocketUpgrade>,
) -> Response {
    let conversation_id = match parse_conversation_id(&conversation_id) {
        Ok(id) => id,
        Err(err) => return err.into_response(),
    };
    let resume_after = match query.after.as_deref().map(str::parse::<MessageId>) {
        None => None,
        Some(Ok(id)) => Some(id),
        Some(Err(_)) => {
            return ApiError::invalid_id("message", query.after.as_deref().unwrap_or_default())
                .into_response()
        }
    };

    let subscription = match state
        .subscriptions
        .handle(SubscribeToConversationCommand {
            caller: Some(user),
            conversation_id,
            resume_after,
        })
        .await
    {
        Ok(subscription) => subscription,
        Err(err) => return ApiError::from(err).into_response(),
    };

    let subscriber = subscription.subscriber;
    let Some(ws) = ws else {
        state.subscriptions.unsubscribe(&subscriber).await;
        return (
            StatusCode::UPGRADE_REQUIRED,
            Json(ErrorResponse {
                code: "UPGRADE_REQUIRED".to_string(),
                message: "Expected a WebSocket upgrade".to_string(),
            }),
        )
            .into_response();
    };

    let on_failure = state.clone();
    ws.on_failed_upgrade(move |err| {
        tracing::debug!(subscriber = %subscriber, "WebSocket upgrade failed: {}", err);
        tokio::spawn(async move {
            on_failure.subscriptions.unsubscribe(&subscriber).await;
        });
    })
    .on_upgrade(move |socket| handle_socket(socket, conversation_id, subscription, state))
}

/// Runs one established connection until either side closes it.
async fn handle_socket(
    socket: WebSocket,
    conversation_id: ConversationId,
    subscription: LiveSubscription,
    state: WebSocketState,
) {
    let LiveSubscription {
        subscriber,
        mut events,
    } = subscription;
    let (mut sender, mut receiver) = socket.split();

    let connected = ServerMessage::Connected(ConnectedMessage {
        conversation_id: conversation_id.to_string(),
        subscriber_id: subscriber.to_string(),
        timestamp: now_rfc3339(),
    });

    if send_message(&mut sender, &connected).await.is_ok() {
        loop {
            tokio::select! {
                event = events.next() => {
                    let Some(event) = event else {
                        tracing::debug!(subscriber = %subscriber, "Feed closed");
                        break;
                    };
                    if let Err(e) = send_message(&mut sender, &ServerMessage::from(event)).await {
                        tracing::debug!(subscriber = %subscriber, "Send error, closing connection: {}", e);
                        break;
                    }
                }
                frame = receiver.next() => {
                    match frame {
                        Some(Ok(WsMessage::Text(text))) => {
                            let reply = match serde_json::from_str::<ClientMessage>(&text) {
                                Ok(ClientMessage::Ping) => ServerMessage::pong(),
                                Err(_) => ServerMessage::error("INVALID_FORMAT", "Unrecognised frame"),
                            };
                            if send_message(&mut sender, &reply).await.is_err() {
                                break;
                            }
                        }
                        Some(Ok(WsMessage::Binary(_))) => {
                            tracing::warn!(subscriber = %subscriber, "Received unsupported binary message");
                        }
                        Some(Ok(WsMessage::Ping(_))) | Some(Ok(WsMessage::Pong(_))) => {}
                        Some(Ok(WsMessage::Close(_))) | None => {
                            tracing::debug!(subscriber = %subscriber, "Client closed connection");
                            break;
                        }
                        Some(Err(e)) => {
                            tracing::debug!(subscriber = %subscriber, "Receive error: {}", e);
                            break;
                        }
                    }
                }
            }
        }
    }

    state.subscriptions.unsubscribe(&subscriber).await;
    tracing::debug!(
        conversation_id = %conversation_id,
        subscriber = %subscriber,
        "Live subscription closed"
    );
}

/// Serializes and sends one frame.
async fn send_message(
    sender: &mut SplitSink<WebSocket, WsMessage>,
    message: &ServerMessage,
) -> Result<(), axum::Error> {
    let json = serde_json::to_string(message).map_err(axum::Error::new)?;
    sender.send(WsMessage::Text(json)).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::http::middleware::{auth_middleware, AuthState};
    use crate::adapters::auth::MockSessionValidator;
    use crate::adapters::memory::InMemoryStore;
    use crate::adapters::websocket::ConversationRooms;
    use crate::domain::foundation::UserType;
    use crate::domain::messaging::Conversation;
    use crate::ports::ConversationRepository;
    use axum::{body::Body, middleware};
    use tower::ServiceExt;

    async fn app() -> (Router, Conversation, Arc<ConversationRooms>) {
        // "alice" is a participant, "outsider" is not
        let store = InMemoryStore::new();
        let alice = store.seed_client("alice@example.com");
        let bob = store.seed_client("bob@example.com");
        let conversation = Conversation::start(alice, bob).unwrap();
        ConversationRepository::insert(&store, &conversation).await.unwrap();

        let validator = MockSessionValidator::new();
        validator.add_token(
            "alice",
            crate::domain::foundation::AuthenticatedUser::new(
                alice,
                "alice@example.com",
                UserType::Client,
            ),
        );
        validator.add_token(
            "outsider",
            crate::domain::foundation::AuthenticatedUser::new(
                crate::domain::foundation::UserId::new(),
                "x@example.com",
                UserType::Client,
            ),
        );
        let auth: AuthState = Arc::new(validator);

        let rooms = Arc::new(ConversationRooms::default());
        let handler = SubscribeToConversationHandler::new(Arc::new(store), rooms.clone());
        let router = live_routes(WebSocketState::new(Arc::new(handler)))
            .layer(middleware::from_fn_with_state(auth, auth_middleware));
        (router, conversation, rooms)
    }

    fn plain_request(path: &str, token: &str) -> axum::http::Request<Body> {
        axum::http::Request::builder()
            .uri(path)
            .header("authorization", format!("Bearer {}", token))
            .body(Body::empty())
            .unwrap()
    }

    fn live_request(path: &str, token: Option<&str>) -> axum::http::Request<Body> {
        let mut builder = axum::http::Request::builder()
            .uri(path)
            .header("connection", "upgrade")
            .header("upgrade", "websocket")
            .header("sec-websocket-version", "13")
            .header("sec-websocket-key", "dGhlIHNhbXBsZSBub25jZQ==");
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {}", token));
        }
        builder.body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn anonymous_upgrade_is_rejected() {
        let (router, conversation, rooms) = app().await;

        let response = router
            .oneshot(live_request(&format!("/{}/live", conversation.id), None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(rooms.active_rooms().await.is_empty());
    }

    #[tokio::test]
    async fn outsider_gets_403_before_upgrade() {
        let (router, conversation, rooms) = app().await;

        let response = router
            .oneshot(live_request(
                &format!("/{}/live", conversation.id),
                Some("outsider"),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert!(rooms.active_rooms().await.is_empty());
    }

    #[tokio::test]
    async fn malformed_resume_token_is_400() {
        let (router, conversation, _rooms) = app().await;

        let response = router
            .oneshot(live_request(
                &format!("/{}/live?after=not-a-uuid", conversation.id),
                Some("outsider"),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn participant_without_upgrade_gets_426_and_no_room() {
        let (router, conversation, rooms) = app().await;

        let response = router
            .oneshot(plain_request(&format!("/{}/live", conversation.id), "alice"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UPGRADE_REQUIRED);
        assert!(rooms.active_rooms().await.is_empty());
    }
}
