//! Request-interception layer: every protected route passes through here
//! before its handler runs.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use tracing::warn;

use crate::{util::require_session_cookie, ApiError, AppState};

/// Validate the session cookie against the identity provider, check the
/// verified identity against the configured admin address, and stash it in
/// the request extensions for handlers to pick up.
pub async fn require_admin(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let cookie = require_session_cookie(request.headers())?;
    let admin = state.authenticate(&cookie).await?;

    // The identity directory also serves the mobile app's users; a valid
    // session alone is not an admin session.
    if !admin
        .email
        .eq_ignore_ascii_case(&state.auth().allowed_admin_email)
    {
        warn!(email = %admin.email, "session rejected for non-admin account");
        return Err(ApiError::forbidden(
            "this account is not authorized for the dashboard",
        ));
    }

    request.extensions_mut().insert(admin);
    Ok(next.run(request).await)
}
