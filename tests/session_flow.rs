//! End-to-end: guarded navigation, sign-in, authorized calls, forced logout.

use std::sync::Arc;
use std::time::Duration;

use axum::Json;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use serde_json::{Value, json};
use silkmall_client::clock::ManualClock;
use silkmall_client::config::ClientConfig;
use silkmall_client::net::api;
use silkmall_client::net::http::{ApiError, HttpTransport};
use silkmall_client::net::types::{LoginPayload, Role};
use silkmall_client::router::routes::AUTH_ENTRY_PATH;
use silkmall_client::router::{GuardDecision, Location, MemoryNavigator, Navigator, RouteTable, Router};
use silkmall_client::state::session::{Session, SessionHandle, StorageKeys};
use silkmall_client::storage::MemoryStore;

const NOW: i64 = 1_700_000_000_000;

async fn login_handler(Json(body): Json<Value>) -> Json<Value> {
    Json(json!({
        "code": 200,
        "message": "success",
        "data": {
            "token": "abc",
            "expiresIn": 3600,
            "issuedAt": NOW,
            "redirectUrl": "/consumer/dashboard",
            "user": { "id": 7, "username": body["username"], "userType": "CONSUMER" }
        },
        "timestamp": NOW
    }))
}

async fn orders(headers: HeaderMap) -> (StatusCode, Json<Value>) {
    let authorized = headers.get("authorization").and_then(|value| value.to_str().ok()) == Some("Bearer abc");
    if authorized {
        (StatusCode::OK, Json(json!({ "code": 200, "message": "success", "data": [] })))
    } else {
        (StatusCode::UNAUTHORIZED, Json(json!({ "code": 401, "message": "login required" })))
    }
}

async fn admin_stats() -> (StatusCode, Json<Value>) {
    (StatusCode::FORBIDDEN, Json(json!({ "code": 403, "message": "admins only" })))
}

struct App {
    durable: Arc<MemoryStore>,
    clock: Arc<ManualClock>,
    navigator: Arc<MemoryNavigator>,
    transport: HttpTransport,
    router: Router,
}

impl App {
    fn session(&self) -> &SessionHandle {
        self.transport.session()
    }
}

async fn start_app() -> App {
    let backend = axum::Router::new()
        .route("/api/auth/login", post(login_handler))
        .route("/api/orders", get(orders))
        .route("/api/admin/stats", get(admin_stats));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, backend).await.unwrap();
    });

    let config = ClientConfig {
        api_base_url: format!("http://{addr}/api/"),
        request_timeout: Duration::from_secs(5),
        ..ClientConfig::default()
    };
    let durable = Arc::new(MemoryStore::new());
    let clock = Arc::new(ManualClock::new(NOW));
    let session = Session::open(
        durable.clone(),
        Arc::new(MemoryStore::new()),
        StorageKeys::from(&config),
        clock.clone(),
    );
    let navigator = Arc::new(MemoryNavigator::new("/"));
    let transport = HttpTransport::new(&config, SessionHandle::new(session), navigator.clone(), AUTH_ENTRY_PATH);
    let router = Router::new(RouteTable::marketplace(), navigator.clone());
    App { durable, clock, navigator, transport, router }
}

fn credentials() -> LoginPayload {
    LoginPayload {
        username: "bob".to_owned(),
        password: "secret".to_owned(),
        challenge_id: "c-1".to_owned(),
        verification_code: "42".to_owned(),
    }
}

fn reopen(app: &App) -> Session {
    Session::open(
        app.durable.clone(),
        Arc::new(MemoryStore::new()),
        StorageKeys::for_app("silkmall"),
        app.clock.clone(),
    )
}

#[tokio::test]
async fn sign_in_round_trip_then_forced_logout() {
    let app = start_app().await;

    // Anonymous visit to a protected page bounces to the auth entry.
    let bounced = app.router.navigate(app.session(), "/orders?page=2");
    assert!(matches!(bounced.decision, GuardDecision::RedirectToAuth(_)));
    assert_eq!(bounced.location.path, "/login");
    assert_eq!(bounced.location.query_value("redirect"), Some("/orders?page=2"));
    assert_eq!(bounced.location.query_value("mode"), Some("login"));

    // Signing in honors the redirect hint.
    let login_page = Location::parse(&app.navigator.current_location());
    let outcome = api::sign_in(&app.transport, &credentials(), login_page.query_value("redirect"))
        .await
        .unwrap();
    assert_eq!(outcome.user.role(), &Role::Consumer);
    assert_eq!(outcome.landing, "/orders?page=2");

    let landed = app.router.navigate(app.session(), &outcome.landing);
    assert_eq!(landed.decision, GuardDecision::Proceed);
    assert_eq!(landed.location.path, "/orders");

    // Authorized call carries the bearer token.
    let orders: Value = app.transport.get("/orders", &[]).await.unwrap();
    assert_eq!(orders["data"], json!([]));

    // Session persisted for the next process.
    assert!(reopen(&app).is_authenticated());

    // A 403 tears the session down and sends the user to sign in again.
    let err = app.transport.get::<Value>("/admin/stats", &[]).await.unwrap_err();
    assert_eq!(err, ApiError::Unauthorized { status: 403, message: "admins only".into() });
    assert!(!app.session().lock().is_authenticated());

    let after = Location::parse(&app.navigator.current_location());
    assert_eq!(after.path, "/login");
    assert_eq!(after.query_value("redirect"), Some("/orders?page=2"));
    assert!(!reopen(&app).is_authenticated());
}

#[tokio::test]
async fn signed_in_user_is_sent_home_from_foreign_areas() {
    let app = start_app().await;
    api::sign_in(&app.transport, &credentials(), None).await.unwrap();

    let nav = app.router.navigate(app.session(), "/admin/overview");
    assert!(matches!(nav.decision, GuardDecision::RedirectToRoleHome(_)));
    assert_eq!(nav.location.path, "/consumer/dashboard");

    let nav = app.router.navigate(app.session(), "/login");
    assert_eq!(nav.location.path, "/consumer/dashboard");
}

#[tokio::test]
async fn expiry_turns_the_session_anonymous_without_events() {
    let app = start_app().await;
    api::sign_in(&app.transport, &credentials(), None).await.unwrap();
    assert!(app.session().lock().is_authenticated());

    app.clock.advance(3_600_000);

    assert!(!app.session().lock().is_authenticated());
    assert_eq!(app.session().lock().token(), None);
    let nav = app.router.navigate(app.session(), "/checkout");
    assert_eq!(nav.location.path, "/login");
    assert!(!reopen(&app).is_authenticated());
}

#[tokio::test]
async fn guest_can_browse_cart_but_not_checkout() {
    let app = start_app().await;
    app.session().lock().enter_guest_mode();

    let cart = app.router.navigate(app.session(), "/cart");
    assert_eq!(cart.decision, GuardDecision::Proceed);

    let checkout = app.router.navigate(app.session(), "/checkout");
    assert!(matches!(checkout.decision, GuardDecision::RedirectToAuth(_)));

    let err = app.transport.get::<Value>("/orders", &[]).await.unwrap_err();
    assert_eq!(err.status(), Some(401));
    assert!(!app.session().lock().is_guest_session());
}
