//! OpenAPI description served next to the dashboard API.
//!
//! Only the stable surfaces are documented for now; the moderation endpoints
//! are still settling with the frontend.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::error::ErrorResponse;
use crate::routes::auth::{LoginRequest, RegisterRequest, SessionResponse, UserResponse};
use crate::routes::health::HealthResponse;
use crate::services::stats::{DashboardStats, MonthBucket};
use crate::util::SESSION_COOKIE;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health::health,
        crate::routes::auth::register,
        crate::routes::auth::login,
        crate::routes::auth::logout,
        crate::routes::auth::me,
        crate::routes::stats::get_stats,
    ),
    components(schemas(
        ErrorResponse,
        HealthResponse,
        RegisterRequest,
        LoginRequest,
        SessionResponse,
        UserResponse,
        DashboardStats,
        MonthBucket,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "homeboy", description = "Admin dashboard backend")
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "session",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new(SESSION_COOKIE))),
            );
        }
    }
}
