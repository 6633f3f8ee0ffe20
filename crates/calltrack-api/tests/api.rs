//! Endpoint tests against the in-memory backend

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use calltrack_api::{AppState, router_with_state};
use calltrack_core::Config;
use calltrack_core::types::{
    AppointmentRecord, CallRecord, CurrentUser, InvitationDetails, Profile, TrustedDevice,
};
use calltrack_pages::MockBackend;
use chrono::{Duration, Utc};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;
use uuid::Uuid;

const TOKEN: &str = "Bearer test-jwt";

fn app(backend: &MockBackend) -> Router {
    router_with_state(AppState::with_connector(
        Config::default(),
        Arc::new(backend.clone()),
    ))
}

fn signed_in_backend() -> (MockBackend, Uuid) {
    let user_id = Uuid::new_v4();
    let backend = MockBackend::new().with_user(CurrentUser {
        id: user_id,
        email: Some("rep@example.com".to_string()),
    });
    (backend, user_id)
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::get(uri)
        .header(header::AUTHORIZATION, TOKEN)
        .body(Body::empty())
        .unwrap()
}

fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::post(uri)
        .header(header::AUTHORIZATION, TOKEN)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn post_empty(uri: &str) -> Request<Body> {
    Request::post(uri)
        .header(header::AUTHORIZATION, TOKEN)
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn test_health() {
    let (status, body) = send(
        app(&MockBackend::new()),
        Request::get("/health").body(Body::empty()).unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_activity_requires_session() {
    let backend = MockBackend::new();
    let (status, body) = send(
        app(&backend),
        Request::get("/api/activity").body(Body::empty()).unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "UNAUTHORIZED");
    assert_eq!(backend.remote_calls(), 0);
}

#[tokio::test]
async fn test_activity_merges_and_filters() {
    let (backend, user_id) = signed_in_backend();
    let now = Utc::now();
    let backend = backend
        .with_call(CallRecord {
            id: Uuid::new_v4(),
            user_id,
            organization_id: None,
            customer_name: Some("Dana Whitfield".to_string()),
            duration_seconds: Some(125),
            created_at: now - Duration::hours(3),
        })
        .with_appointment(AppointmentRecord {
            id: Uuid::new_v4(),
            user_id,
            customer_name: "Harbor Logistics".to_string(),
            appointment_date: now + Duration::days(2),
            created_at: now - Duration::hours(1),
        });

    let (status, body) = send(app(&backend), get("/api/activity")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["entries"].as_array().unwrap().len(), 2);
    assert_eq!(body["entries"][0]["type"], "appointment");
    assert_eq!(body["entries"][1]["type"], "call");

    let (status, body) = send(app(&backend), get("/api/activity?q=harbor")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["entries"].as_array().unwrap().len(), 1);
    assert_eq!(body["query"], "harbor");
}

#[tokio::test]
async fn test_backend_failure_without_message_is_generic() {
    let (backend, _) = signed_in_backend();
    let backend = backend.fail_on("calls_for_user", None);

    let (status, body) = send(app(&backend), get("/api/activity")).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"], calltrack_pages::GENERIC_ERROR_MESSAGE);
}

#[tokio::test]
async fn test_leaderboard_ranks_organization() {
    let (backend, user_id) = signed_in_backend();
    let rival = Uuid::new_v4();
    let org = Uuid::new_v4();
    let now = Utc::now();

    let call = |user: Uuid, days_ago: i64| CallRecord {
        id: Uuid::new_v4(),
        user_id: user,
        organization_id: Some(org),
        customer_name: None,
        duration_seconds: None,
        created_at: now - Duration::days(days_ago),
    };

    let backend = backend
        .with_profile(Profile {
            user_id,
            full_name: Some("Ada".to_string()),
            email: None,
            organization_id: Some(org),
        })
        .with_profile(Profile {
            user_id: rival,
            full_name: Some("Ben".to_string()),
            email: None,
            organization_id: Some(org),
        })
        .with_call(call(rival, 1))
        .with_call(call(rival, 2))
        .with_call(call(user_id, 3))
        .with_call(call(user_id, 45));

    let (status, body) = send(app(&backend), get("/api/leaderboard")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["window_days"], 30);
    assert_eq!(body["rankings"][0]["name"], "Ben");
    assert_eq!(body["rankings"][0]["recording_count"], 2);
    assert_eq!(body["rankings"][1]["recording_count"], 1);
    assert_eq!(body["rankings"][1]["conversion_rate"]["status"], "pending");
    assert_eq!(body["current_user"]["rank"], 2);

    let (status, body) = send(app(&backend), get("/api/leaderboard?days=60")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["rankings"][0]["name"], "Ada");

    let (status, _) = send(app(&backend), get("/api/leaderboard?days=0")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

fn invited_backend() -> MockBackend {
    MockBackend::new().with_invitation(
        "inv-42",
        InvitationDetails {
            email: "new.rep@example.com".to_string(),
            organization_name: Some("Acme".to_string()),
            role: None,
        },
    )
}

#[tokio::test]
async fn test_invitation_lookup() {
    let backend = invited_backend();

    let (status, body) = send(
        app(&backend),
        Request::get("/api/invitations/validate?token=inv-42")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["state"], "valid");
    assert_eq!(body["details"]["email"], "new.rep@example.com");

    let (status, body) = send(
        app(&backend),
        Request::get("/api/invitations/validate?token=unknown")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["state"], "invalid");
    assert_eq!(backend.calls_to("validate_invitation"), 2);

    let (status, body) = send(
        app(&backend),
        Request::get("/api/invitations/validate")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["state"], "invalid");
    assert_eq!(backend.calls_to("validate_invitation"), 2);
}

#[tokio::test]
async fn test_accept_rejects_form_before_backend() {
    let backend = invited_backend();
    let request = json!({
        "token": "inv-42",
        "full_name": "Ada Lovelace",
        "password": "short",
        "confirm_password": "short"
    });

    let (status, body) = send(
        app(&backend),
        post_json("/api/invitations/accept", &request),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert_eq!(body["details"]["field"], "password");
    assert_eq!(backend.remote_calls(), 0);
}

#[tokio::test]
async fn test_accept_creates_account() {
    let backend = invited_backend();
    let request = json!({
        "token": "inv-42",
        "full_name": "  Ada Lovelace ",
        "password": "correct horse",
        "confirm_password": "correct horse"
    });

    let (status, body) = send(
        app(&backend),
        post_json("/api/invitations/accept", &request),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["state"], "success");
    assert_eq!(body["redirect_to"], "/auth?invited=true");
    assert_eq!(body["toasts"][0]["kind"], "success");

    let accepted = backend.accepted_invitations();
    assert_eq!(accepted.len(), 1);
    assert_eq!(accepted[0].full_name, "Ada Lovelace");
}

#[tokio::test]
async fn test_accept_with_unknown_token() {
    let backend = invited_backend();
    let request = json!({
        "token": "nope",
        "full_name": "Ada Lovelace",
        "password": "correct horse",
        "confirm_password": "correct horse"
    });

    let (status, body) = send(
        app(&backend),
        post_json("/api/invitations/accept", &request),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_TOKEN");
    assert_eq!(backend.calls_to("accept_invitation"), 0);
}

#[tokio::test]
async fn test_two_factor_lifecycle() {
    let (backend, _) = signed_in_backend();

    let (status, body) = send(app(&backend), get("/api/security/2fa")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["state"], "disabled");

    let (status, body) = send(app(&backend), post_empty("/api/security/2fa/setup")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["state"], "setup_in_progress");
    let codes = body["setup"]["backup_codes"].as_array().unwrap().len();
    let text = body["backup_codes_text"].as_str().unwrap();
    assert_eq!(text.lines().count(), codes);

    let (status, body) = send(app(&backend), get("/api/security/2fa")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["state"], "setup_in_progress");

    let (status, body) = send(
        app(&backend),
        post_json("/api/security/2fa/enable", &json!({ "code": "123 456" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["state"], "enabled");
    assert!(backend.two_factor_is_enabled());

    let (status, _) = send(app(&backend), post_empty("/api/security/2fa/setup")).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = send(app(&backend), post_empty("/api/security/2fa/disable")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["state"], "disabled");
}

#[tokio::test]
async fn test_malformed_code_never_reaches_backend() {
    let (backend, _) = signed_in_backend();

    let (status, body) = send(
        app(&backend),
        post_json("/api/security/2fa/enable", &json!({ "code": "12345" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"]["field"], "code");
    assert_eq!(backend.remote_calls(), 0);
}

#[tokio::test]
async fn test_enable_without_setup_conflicts() {
    let (backend, _) = signed_in_backend();

    let (status, body) = send(
        app(&backend),
        post_json("/api/security/2fa/enable", &json!({ "code": "123456" })),
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "INVALID_STATE");
    assert_eq!(backend.calls_to("enable_two_factor"), 0);
}

#[tokio::test]
async fn test_devices_are_paged_and_removable() {
    let (mut backend, _) = signed_in_backend();
    let now = Utc::now();
    let mut ids = Vec::new();
    for minutes in 0..25 {
        let id = Uuid::new_v4();
        ids.push(id);
        backend = backend.with_device(TrustedDevice {
            id,
            device_name: format!("Laptop {minutes}"),
            last_used_at: Some(now - Duration::minutes(minutes)),
            created_at: now - Duration::days(10),
        });
    }

    let (status, body) = send(app(&backend), get("/api/security/devices")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["items"].as_array().unwrap().len(), 20);
    assert_eq!(body["has_more"], true);

    let (status, body) = send(app(&backend), get("/api/security/devices?page=2")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["items"].as_array().unwrap().len(), 5);
    assert_eq!(body["has_more"], false);

    let (status, _) = send(app(&backend), get("/api/security/devices?page=0")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let removal = Request::delete(format!("/api/security/devices/{}", ids[0]))
        .header(header::AUTHORIZATION, TOKEN)
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(app(&backend), removal).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["toasts"][0]["title"], "Device removed");

    let (_, body) = send(app(&backend), get("/api/security/devices?page=2")).await;
    assert_eq!(body["items"].as_array().unwrap().len(), 4);

    let bad_id = Request::delete("/api/security/devices/not-a-uuid")
        .header(header::AUTHORIZATION, TOKEN)
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(app(&backend), bad_id).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_login_history_empty_page() {
    let (backend, _) = signed_in_backend();

    let (status, body) = send(app(&backend), get("/api/security/login-history")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["items"], json!([]));
    assert_eq!(body["page"], 1);
    assert_eq!(body["has_more"], false);
}
