use axum::http::{header::COOKIE, HeaderMap};

use crate::ApiError;

pub const SESSION_COOKIE: &str = "homeboy_session";

pub fn require_session_cookie(headers: &HeaderMap) -> Result<String, ApiError> {
    let value = headers
        .get(COOKIE)
        .and_then(|header| header.to_str().ok())
        .ok_or_else(|| ApiError::unauthorized("missing session cookie"))?;

    for pair in value.split(';') {
        let mut parts = pair.trim().splitn(2, '=');
        if parts.next() != Some(SESSION_COOKIE) {
            continue;
        }

        let token = parts.next().unwrap_or("");
        if token.is_empty() {
            return Err(ApiError::unauthorized("empty session cookie"));
        }
        return Ok(token.to_string());
    }

    Err(ApiError::unauthorized("missing session cookie"))
}

pub fn session_cookie_header(token: &str, max_age_seconds: u64, secure: bool) -> String {
    let mut cookie = format!(
        "{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age_seconds}"
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

pub fn clear_session_cookie_header(secure: bool) -> String {
    session_cookie_header("", 0, secure)
}
