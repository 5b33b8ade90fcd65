//! Integration tests for sign-up, sign-in and session handling over HTTP.

mod common;

use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::json;

use common::TestApp;

async fn register(app: &TestApp, email: &str, user_type: &str) -> (StatusCode, serde_json::Value) {
    app.post(
        "/api/auth/register",
        None,
        json!({ "email": email, "password": "hunter22", "user_type": user_type }),
    )
    .await
}

#[tokio::test]
async fn register_creates_profile_with_role() {
    let app = TestApp::with_identity_sessions();

    let (status, body) = register(&app, "ada@example.com", "companion").await;

    assert_eq!(status, StatusCode::CREATED, "{}", body);
    assert_eq!(body["email"], "ada@example.com");
    assert_eq!(body["user_type"], "companion");
    assert_eq!(app.identity.account_count(), 1);
}

#[tokio::test]
async fn register_rejects_admin_and_duplicates() {
    let app = TestApp::with_identity_sessions();

    let (status, _) = register(&app, "root@example.com", "admin").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    register(&app, "ada@example.com", "client").await;
    let (status, _) = register(&app, "ada@example.com", "client").await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn unknown_role_registers_as_client() {
    let app = TestApp::with_identity_sessions();

    let (status, body) = register(&app, "ada@example.com", "wizard").await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["user_type"], "client");
}

#[tokio::test]
async fn sign_in_sets_cookie_and_records_login() {
    let app = TestApp::with_identity_sessions();
    register(&app, "ada@example.com", "client").await;

    let response = tower::ServiceExt::oneshot(
        app.router.clone(),
        Request::builder()
            .method("POST")
            .uri("/api/auth/sign-in")
            .header("content-type", "application/json")
            .body(Body::from(
                json!({ "email": "ada@example.com", "password": "hunter22" }).to_string(),
            ))
            .unwrap(),
    )
    .await
    .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let cookie = response.headers()["set-cookie"].to_str().unwrap().to_string();
    assert!(cookie.starts_with("access_token="));
    assert!(cookie.contains("HttpOnly"));

    // Login is tracked in the background
    let mut logins = 0;
    for _ in 0..50 {
        logins = app
            .store
            .events()
            .iter()
            .filter(|e| e.event_type == "login")
            .count();
        if logins > 0 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(logins, 1);

    // The cookie alone is a session on pages and the API
    let token = cookie
        .trim_start_matches("access_token=")
        .split(';')
        .next()
        .unwrap()
        .to_string();
    let (status, body) = app
        .send(
            Request::builder()
                .uri("/api/auth/session")
                .header("cookie", format!("access_token={}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "ada@example.com");
}

#[tokio::test]
async fn wrong_password_is_401() {
    let app = TestApp::with_identity_sessions();
    register(&app, "ada@example.com", "client").await;

    let (status, body) = app
        .post(
            "/api/auth/sign-in",
            None,
            json!({ "email": "ada@example.com", "password": "nope-nope" }),
        )
        .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn sign_out_ends_the_session() {
    let app = TestApp::with_identity_sessions();
    register(&app, "ada@example.com", "client").await;
    let (_, session) = app
        .post(
            "/api/auth/sign-in",
            None,
            json!({ "email": "ada@example.com", "password": "hunter22" }),
        )
        .await;
    let token = session["access_token"].as_str().unwrap().to_string();

    let (status, _) = app.post("/api/auth/sign-out", Some(&token), json!({})).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app.get("/api/auth/session", &token).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn password_reset_is_accepted() {
    let app = TestApp::with_identity_sessions();

    let (status, _) = app
        .post(
            "/api/auth/password-reset",
            None,
            json!({ "email": "ada@example.com" }),
        )
        .await;

    assert_eq!(status, StatusCode::ACCEPTED);
    let requests = app.identity.reset_requests();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].1.ends_with("/reset-password"));
}

#[tokio::test]
async fn anonymous_visitor_is_sent_to_login() {
    let app = TestApp::new();

    let (status, _) = app
        .send(
            Request::builder()
                .uri("/bookings")
                .body(Body::empty())
                .unwrap(),
        )
        .await;

    assert_eq!(status, StatusCode::TEMPORARY_REDIRECT);
}
