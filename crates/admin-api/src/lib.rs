mod docs;
mod error;
mod middleware;
mod state;
mod util;

pub mod routes;
pub mod services;

pub use error::{ApiError, ErrorResponse};
pub use state::AppState;
pub use util::SESSION_COOKIE;

use axum::{
    http::header::{AUTHORIZATION, CONTENT_TYPE},
    middleware::from_fn_with_state,
    routing::{get, patch, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub fn build_router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/api/auth/logout", post(routes::auth::logout))
        .route("/api/auth/me", get(routes::auth::me))
        // Listing routes
        .route("/api/listings", get(routes::listings::list_listings))
        .route("/api/listings", post(routes::listings::create_listing))
        .route("/api/listings/:id", get(routes::listings::get_listing))
        .route(
            "/api/listings/:id/status",
            patch(routes::listings::update_listing_status),
        )
        // Inquiry routes
        .route("/api/inquiries", get(routes::inquiries::list_inquiries))
        .route("/api/inquiries/:id", get(routes::inquiries::get_inquiry))
        .route(
            "/api/inquiries/:id/status",
            patch(routes::inquiries::update_inquiry_status),
        )
        // Notification routes
        .route(
            "/api/notifications",
            get(routes::notifications::list_notifications),
        )
        .route(
            "/api/notifications",
            post(routes::notifications::send_notification),
        )
        .route(
            "/api/notifications/unseen-count",
            get(routes::notifications::unseen_count),
        )
        .route(
            "/api/notifications/:id/seen",
            patch(routes::notifications::mark_seen),
        )
        .route("/api/stats", get(routes::stats::get_stats))
        .route_layer(from_fn_with_state(state.clone(), middleware::require_admin));

    Router::new()
        .route("/health", get(routes::health::health))
        .route("/api/auth/register", post(routes::auth::register))
        .route("/api/auth/login", post(routes::auth::login))
        .merge(protected)
        .merge(
            SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", docs::ApiDoc::openapi()),
        )
        .with_state(state)
        .layer(cors_layer())
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::PUT,
            axum::http::Method::PATCH,
            axum::http::Method::DELETE,
            axum::http::Method::OPTIONS,
        ])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE])
}
