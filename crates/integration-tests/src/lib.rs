//! Shared fixtures for the end-to-end tests: an in-memory store, a clock
//! the tests can move, and the fully wired router.

use std::sync::{Arc, Mutex, PoisonError};

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use chrono::{DateTime, Duration, TimeZone, Utc};
use secrecy::SecretString;

use api_adapters::AppState;
use auth_adapters::JwtAuthProvider;
use domains::{AuthProvider, Clock, Identity, NewService, NewUser, Role, Service, ServiceRepo, User, UserRepo};
use storage_adapters::SqliteStore;
use tower::ServiceExt;

/// A clock that only moves when told to.
pub struct FixedClock(Mutex<DateTime<Utc>>);

impl FixedClock {
    pub fn at(now: DateTime<Utc>) -> Self {
        Self(Mutex::new(now))
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.0.lock().unwrap_or_else(PoisonError::into_inner) = now;
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        *now += by;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// 2025-06-01 12:00 UTC, well before the 2099 bookings the tests make.
pub fn epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
}

pub struct TestApp {
    pub store: Arc<SqliteStore>,
    pub clock: Arc<FixedClock>,
    pub auth: Arc<JwtAuthProvider>,
    pub state: AppState,
}

impl TestApp {
    pub async fn spawn() -> Self {
        let store = Arc::new(
            SqliteStore::connect("sqlite::memory:", 1)
                .await
                .unwrap_or_else(|e| panic!("in-memory store: {e}")),
        );
        let clock = Arc::new(FixedClock::at(epoch()));
        let auth = Arc::new(JwtAuthProvider::new(
            &SecretString::from("integration-secret"),
            Duration::hours(1),
        ));
        let state = AppState::new(store.clone(), auth.clone(), clock.clone());

        Self {
            store,
            clock,
            auth,
            state,
        }
    }

    pub fn router(&self) -> Router {
        api_adapters::router(self.state.clone(), &["http://localhost:5173".to_string()])
    }

    /// Inserts an account directly, skipping password hashing.
    pub async fn user(&self, name: &str, role: Role) -> User {
        self.store
            .create_user(NewUser {
                name: name.to_string(),
                email: format!("{}@example.com", name.to_lowercase()),
                password_hash: "not-a-real-hash".into(),
                role,
                mobile: None,
                age: None,
                location: Some("Leeds".into()),
                bio: None,
                created_at: self.clock.now(),
            })
            .await
            .unwrap_or_else(|e| panic!("create user {name}: {e}"))
    }

    pub async fn service(&self, provider: &User, name: &str) -> Service {
        self.store
            .create_service(
                provider.id,
                NewService {
                    service_name: name.to_string(),
                    description: Some(format!("{name} by {}", provider.name)),
                    min_price: 50.0,
                    category: "Home".into(),
                    image_url: None,
                },
                self.clock.now(),
            )
            .await
            .unwrap_or_else(|e| panic!("create service {name}: {e}"))
    }

    pub fn bearer(&self, user: &User) -> String {
        let token = self
            .auth
            .issue_token(&identity(user))
            .unwrap_or_else(|e| panic!("issue token: {e}"));
        format!("Bearer {token}")
    }
}

pub fn identity(user: &User) -> Identity {
    Identity {
        user_id: user.id,
        role: user.role,
    }
}

/// Builds a JSON request, with an `Authorization` header when `bearer` is given.
pub fn json_request(
    method: Method,
    uri: &str,
    bearer: Option<&str>,
    body: Option<serde_json::Value>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(bearer) = bearer {
        builder = builder.header(header::AUTHORIZATION, bearer);
    }
    let body = match body {
        Some(json) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };
    builder
        .body(body)
        .unwrap_or_else(|e| panic!("request {uri}: {e}"))
}

/// Runs one request through a fresh router and returns the status and raw body.
pub async fn send(router: Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = router
        .oneshot(request)
        .await
        .unwrap_or_else(|e| panic!("router failed: {e}"));
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap_or_else(|e| panic!("read body: {e}"));
    (status, body.to_vec())
}

/// Like [`send`], parsing the body as JSON (`Null` when empty).
pub async fn send_json(router: Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let (status, body) = send(router, request).await;
    if body.is_empty() {
        return (status, serde_json::Value::Null);
    }
    let json = serde_json::from_slice(&body)
        .unwrap_or_else(|e| panic!("non-JSON body ({status}): {e}"));
    (status, json)
}
