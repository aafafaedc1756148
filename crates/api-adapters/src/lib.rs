//! # api-adapters
//!
//! The HTTP surface of SkillBridge: axum routing, request extraction, error
//! rendering and the middleware stack.

pub mod error;
pub mod extract;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod state;

use axum::http::HeaderName;
use axum::routing::{get, post, put};
use axum::Router;
use tower::ServiceBuilder;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::{DefaultOnResponse, TraceLayer};
use tracing::Level;

pub use error::ApiError;
pub use metrics::Metrics;
pub use state::AppState;

use handlers::{accounts, availability, bookings, calendar, catalog, notifications, reviews, system};

/// Builds the full application router.
///
/// Static segments (`/services/my`, `/notifications/read-all`, ...) are
/// matched before the `{id}` captures next to them.
pub fn router(state: AppState, allowed_origins: &[String]) -> Router {
    let request_id = HeaderName::from_static(middleware::REQUEST_ID_HEADER);

    Router::new()
        .route("/", get(system::root))
        .route("/health", get(system::health))
        .route("/stats", get(system::stats))
        .route("/metrics", get(system::metrics))
        // Accounts
        .route("/auth/register", post(accounts::register))
        .route("/auth/login", post(accounts::login))
        .route("/users/me", get(accounts::me).put(accounts::update_me))
        .route("/users/providers/list", get(accounts::list_providers))
        .route("/users/{user_id}", get(accounts::get_user))
        // Catalog
        .route("/services", get(catalog::list_services).post(catalog::create_service))
        .route("/services/categories", get(catalog::categories))
        .route("/services/my", get(catalog::my_services))
        .route("/services/provider/{provider_id}", get(catalog::provider_services))
        .route(
            "/services/{service_id}",
            get(catalog::get_service)
                .put(catalog::update_service)
                .delete(catalog::delete_service),
        )
        // Booking lifecycle
        .route("/bookings", post(bookings::create_booking))
        .route("/bookings/user", get(bookings::user_bookings))
        .route("/bookings/provider", get(bookings::provider_bookings))
        .route("/bookings/{booking_id}/status", put(bookings::update_status))
        // Reviews
        .route("/reviews", post(reviews::submit_review))
        .route("/reviews/{booking_id}", put(reviews::edit_review))
        .route("/reviews/booking/{booking_id}", get(reviews::review_for_booking))
        .route("/reviews/provider/{provider_id}", get(reviews::provider_reviews))
        .route("/reviews/provider/{provider_id}/avg", get(reviews::provider_average))
        // Calendar
        .route("/calendar", get(calendar::list_events).post(calendar::create_event))
        .route(
            "/calendar/{event_id}",
            put(calendar::update_event).delete(calendar::delete_event),
        )
        // Notifications
        .route("/notifications", get(notifications::list_notifications))
        .route("/notifications/read-all", put(notifications::mark_all_read))
        .route("/notifications/unread-count", get(notifications::unread_count))
        .route("/notifications/{notification_id}/read", put(notifications::mark_read))
        // Availability
        .route(
            "/availability",
            get(availability::my_availability).post(availability::set_availability),
        )
        .route(
            "/availability/{id}",
            get(availability::provider_availability).delete(availability::delete_availability),
        )
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(request_id.clone(), MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(middleware::make_request_span)
                        .on_response(DefaultOnResponse::new().level(Level::INFO)),
                )
                .layer(PropagateRequestIdLayer::new(request_id))
                .layer(middleware::cors_policy(allowed_origins)),
        )
        .with_state(state)
}
