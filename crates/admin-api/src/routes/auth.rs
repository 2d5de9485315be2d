//! Session-cookie authentication endpoints.
//!
//! The dashboard is single-tenant: only the configured admin address may sign
//! in, checked before the identity service is ever asked to verify the
//! password. Registration stays open so the admin account can bootstrap
//! itself on a fresh project.

use axum::extract::State;
use axum::http::header::SET_COOKIE;
use axum::response::{AppendHeaders, IntoResponse};
use axum::{Extension, Json};
use chrono::{Duration as ChronoDuration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use utoipa::ToSchema;

use homeboy_platform::UserRecord;

use crate::util::{clear_session_cookie_header, session_cookie_header};
use crate::{ApiError, AppState};

#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize, ToSchema)]
pub struct UserResponse {
    pub uid: String,
    pub email: String,
    pub display_name: Option<String>,
    pub is_admin: bool,
}

#[derive(Serialize, ToSchema)]
pub struct SessionResponse {
    pub user: UserResponse,
    pub expires_at: String,
}

#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "Account created", body = UserResponse),
        (status = 400, description = "Invalid request or account exists", body = crate::error::ErrorResponse)
    )
)]
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    if request.email.trim().is_empty() || !request.email.contains('@') {
        return Err(ApiError::bad_request("a valid email address is required"));
    }
    if request.password.len() < 6 {
        return Err(ApiError::bad_request(
            "password must be at least 6 characters",
        ));
    }

    let record = state
        .identity()
        .sign_up(
            &request.email,
            &request.password,
            request.display_name.as_deref(),
        )
        .await?;

    let is_admin = record
        .email
        .eq_ignore_ascii_case(&state.auth().allowed_admin_email);
    let profile = state
        .users()
        .ensure_profile(
            &record.uid,
            &record.email,
            record.display_name.as_deref(),
            is_admin,
        )
        .await?;

    info!(uid = %record.uid, "account registered");
    Ok(Json(UserResponse {
        uid: profile.uid,
        email: profile.email,
        display_name: profile.display_name,
        is_admin: profile.is_admin,
    }))
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Session established", body = SessionResponse),
        (status = 401, description = "Wrong credentials", body = crate::error::ErrorResponse),
        (status = 403, description = "Not the dashboard admin", body = crate::error::ErrorResponse)
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    // Gate on the allow-list before touching the identity service so
    // non-admin accounts cannot test passwords through this surface.
    if !request
        .email
        .eq_ignore_ascii_case(&state.auth().allowed_admin_email)
    {
        warn!(email = %request.email, "login rejected for non-admin address");
        return Err(ApiError::forbidden(
            "this account is not authorized for the dashboard",
        ));
    }

    let signed_in = state
        .identity()
        .sign_in(&request.email, &request.password)
        .await?;
    let cookie = state
        .identity()
        .create_session_cookie(&signed_in.id_token, state.session_ttl())
        .await?;

    let profile = state
        .users()
        .ensure_profile(&signed_in.uid, &request.email, None, true)
        .await?;

    let expires_at = Utc::now()
        + ChronoDuration::seconds(state.auth().session_ttl_seconds as i64);

    info!(uid = %signed_in.uid, "admin session established");
    let headers = AppendHeaders([(
        SET_COOKIE,
        session_cookie_header(
            &cookie,
            state.auth().session_ttl_seconds,
            state.auth().cookie_secure,
        ),
    )]);

    Ok((
        headers,
        Json(SessionResponse {
            user: UserResponse {
                uid: profile.uid,
                email: profile.email,
                display_name: profile.display_name,
                is_admin: profile.is_admin,
            },
            expires_at: expires_at.to_rfc3339(),
        }),
    ))
}

#[utoipa::path(
    post,
    path = "/api/auth/logout",
    responses(
        (status = 200, description = "Session revoked"),
        (status = 401, description = "No valid session", body = crate::error::ErrorResponse)
    )
)]
pub async fn logout(
    State(state): State<AppState>,
    Extension(admin): Extension<UserRecord>,
) -> Result<impl IntoResponse, ApiError> {
    state.identity().revoke_sessions(&admin.uid).await?;
    info!(uid = %admin.uid, "admin session revoked");

    let headers = AppendHeaders([(
        SET_COOKIE,
        clear_session_cookie_header(state.auth().cookie_secure),
    )]);
    Ok((headers, Json(serde_json::json!({ "success": true }))))
}

#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses(
        (status = 200, description = "The signed-in admin", body = UserResponse),
        (status = 401, description = "No valid session", body = crate::error::ErrorResponse)
    )
)]
pub async fn me(
    State(state): State<AppState>,
    Extension(admin): Extension<UserRecord>,
) -> Result<Json<UserResponse>, ApiError> {
    let profile = state.users().find(&admin.uid).await?;

    // The identity record is authoritative for email; the profile document
    // may lag behind on a fresh project.
    Ok(Json(match profile {
        Some(profile) => UserResponse {
            uid: profile.uid,
            email: profile.email,
            display_name: profile.display_name,
            is_admin: profile.is_admin,
        },
        None => UserResponse {
            uid: admin.uid,
            email: admin.email,
            display_name: admin.display_name,
            is_admin: true,
        },
    }))
}
