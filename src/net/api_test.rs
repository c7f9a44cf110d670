use std::collections::HashMap;
use std::sync::Arc;

use axum::Json;
use axum::extract::Query;
use axum::http::StatusCode;
use axum::routing::{get, post};
use serde_json::json;

use super::*;
use crate::config::ClientConfig;
use crate::router::navigator::MemoryNavigator;
use crate::state::session::SessionHandle;
use crate::state::session::test_helpers::{Fixture, NOW};
use crate::storage::KeyValueStore;

// =============================================================
// Stub backend
// =============================================================

fn envelope(data: Value, message: &str) -> Json<Value> {
    Json(json!({ "code": 200, "message": message, "data": data, "timestamp": NOW }))
}

async fn captcha() -> Json<Value> {
    envelope(json!({ "challengeId": "c-1", "question": "6 x 7 = ?", "expiresIn": 300 }), "success")
}

async fn login_handler(Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    if body["challengeId"] != "c-1" || body["verificationCode"] != "42" {
        return (StatusCode::UNAUTHORIZED, Json(json!({ "code": 401, "message": "invalid captcha", "data": null })));
    }
    let role = if body["username"] == "sue" { "supplier" } else { "consumer" };
    let redirect = format!("/{role}/{}", if role == "supplier" { "workbench" } else { "dashboard" });
    let data = json!({
        "token": "abc",
        "expiresIn": 3600,
        "issuedAt": NOW,
        "redirectUrl": redirect,
        "user": { "id": 1, "username": body["username"], "userType": role }
    });
    (StatusCode::OK, envelope(data, "success"))
}

async fn register_handler(Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    if body["username"] == "taken" {
        return (StatusCode::BAD_REQUEST, Json(json!({ "code": 400, "message": "username already exists", "data": null })));
    }
    (StatusCode::CREATED, envelope(Value::Null, "registered"))
}

async fn forgot_password(Query(params): Query<HashMap<String, String>>) -> (StatusCode, Json<Value>) {
    if params.get("email").map(String::as_str) == Some("known@example.com") {
        return (StatusCode::OK, envelope(json!("reset link sent"), "success"));
    }
    (StatusCode::NOT_FOUND, Json(json!({ "code": 404, "message": "email not found", "data": null })))
}

async fn transport_for_stub(current_location: &str) -> (Fixture, HttpTransport) {
    let app = axum::Router::new()
        .route("/api/auth/captcha", get(captcha))
        .route("/api/auth/login", post(login_handler))
        .route("/api/auth/register", post(register_handler))
        .route("/api/auth/forgot-password", post(forgot_password));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let config = ClientConfig { api_base_url: format!("http://{addr}/api"), ..ClientConfig::default() };
    let fixture = Fixture::new();
    let session = SessionHandle::new(fixture.open());
    let transport = HttpTransport::new(&config, session, Arc::new(MemoryNavigator::new(current_location)), "/login");
    (fixture, transport)
}

fn credentials(username: &str, code: &str) -> LoginPayload {
    LoginPayload {
        username: username.to_owned(),
        password: "secret".to_owned(),
        challenge_id: "c-1".to_owned(),
        verification_code: code.to_owned(),
    }
}

fn registration(user_type: Role, company_name: Option<&str>) -> RegisterPayload {
    RegisterPayload {
        username: "carol".to_owned(),
        password: "pw123456".to_owned(),
        confirm_password: "pw123456".to_owned(),
        email: "carol@example.com".to_owned(),
        phone: "13800000000".to_owned(),
        user_type,
        company_name: company_name.map(str::to_owned),
    }
}

// =============================================================
// captcha / login
// =============================================================

#[tokio::test]
async fn request_captcha_unwraps_envelope() {
    let (_, transport) = transport_for_stub("/login").await;
    let challenge = request_captcha(&transport).await.unwrap();
    assert_eq!(challenge.challenge_id, "c-1");
    assert_eq!(challenge.expires_in, 300);
}

#[tokio::test]
async fn login_does_not_touch_session() {
    let (_, transport) = transport_for_stub("/login").await;
    let response = login(&transport, &credentials("bob", "42")).await.unwrap();
    assert_eq!(response.token, "abc");
    assert!(!transport.session().lock().is_authenticated());
}

#[tokio::test]
async fn sign_in_adopts_session_and_uses_redirect_hint() {
    let (fixture, transport) = transport_for_stub("/login?redirect=/orders").await;

    let outcome = sign_in(&transport, &credentials("bob", "42"), Some("/orders")).await.unwrap();

    assert_eq!(outcome.landing, "/orders");
    assert_eq!(outcome.user.role(), &Role::Consumer);
    let session = transport.session().lock();
    assert!(session.is_authenticated());
    assert_eq!(session.record().expires_at, Some(NOW + 3_600_000));
    assert!(fixture.durable.get_item("silkmall.auth").unwrap().is_some());
}

#[tokio::test]
async fn sign_in_without_hint_uses_server_redirect() {
    let (_, transport) = transport_for_stub("/login").await;
    let outcome = sign_in(&transport, &credentials("sue", "42"), None).await.unwrap();
    assert_eq!(outcome.landing, "/supplier/workbench");
}

#[tokio::test]
async fn failed_sign_in_reports_server_message() {
    let (_, transport) = transport_for_stub("/login").await;
    let err = sign_in(&transport, &credentials("bob", "0"), None).await.unwrap_err();
    assert_eq!(err.message(), "invalid captcha");
    assert!(!transport.session().lock().is_authenticated());
}

// =============================================================
// register
// =============================================================

#[tokio::test]
async fn register_consumer_returns_server_message() {
    let (_, transport) = transport_for_stub("/login").await;
    let message = register(&transport, &registration(Role::Consumer, None)).await.unwrap();
    assert_eq!(message, "registered");
}

#[tokio::test]
async fn register_rejection_is_api_error() {
    let (_, transport) = transport_for_stub("/login").await;
    let mut payload = registration(Role::Consumer, None);
    payload.username = "taken".to_owned();
    let err = register(&transport, &payload).await.unwrap_err();
    assert_eq!(err.to_string(), "username already exists");
    assert!(matches!(err, RegisterError::Api(ApiError::Status { status: 400, .. })));
}

#[tokio::test]
async fn register_invalid_form_never_hits_backend() {
    let (_, transport) = transport_for_stub("/login").await;
    let err = register(&transport, &registration(Role::Supplier, None)).await.unwrap_err();
    assert_eq!(err, RegisterError::Invalid("Company name is required for suppliers."));
}

#[test]
fn validate_registration_rules() {
    assert_eq!(validate_registration(&registration(Role::Consumer, None)), Ok(()));
    assert_eq!(validate_registration(&registration(Role::Supplier, Some("Silk Co."))), Ok(()));
    assert!(validate_registration(&registration(Role::Supplier, Some("   "))).is_err());
    assert_eq!(
        validate_registration(&registration(Role::Admin, None)),
        Err("Only consumer or supplier accounts can be registered.")
    );

    let mut mismatched = registration(Role::Consumer, None);
    mismatched.confirm_password = "other".to_owned();
    assert_eq!(validate_registration(&mismatched), Err("Passwords do not match."));

    let mut blank = registration(Role::Consumer, None);
    blank.username = "  ".to_owned();
    assert_eq!(validate_registration(&blank), Err("Username and password are required."));
}

// =============================================================
// forgot-password
// =============================================================

#[tokio::test]
async fn password_reset_known_email() {
    let (_, transport) = transport_for_stub("/login").await;
    let message = request_password_reset(&transport, "known@example.com").await.unwrap();
    assert_eq!(message, "reset link sent");
}

#[tokio::test]
async fn password_reset_unknown_email() {
    let (_, transport) = transport_for_stub("/login").await;
    let err = request_password_reset(&transport, "nobody@example.com").await.unwrap_err();
    assert_eq!(err, ApiError::Status { status: 404, message: "email not found".into() });
}
