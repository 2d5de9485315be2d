use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use homeboy_platform::PlatformError;
use homeboy_records::RecordError;
use serde::Serialize;
use tracing::error;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, message)
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorResponse {
            error: self.message,
        });
        (self.status, body).into_response()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(error: anyhow::Error) -> Self {
        error!(error = ?error, "internal error");
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, error.to_string())
    }
}

impl From<PlatformError> for ApiError {
    fn from(error: PlatformError) -> Self {
        error!(error = ?error, "platform error");
        let status = match &error {
            PlatformError::InvalidCredentials | PlatformError::InvalidSession => {
                StatusCode::UNAUTHORIZED
            }
            PlatformError::AccountExists => StatusCode::BAD_REQUEST,
            PlatformError::NotFound(_) => StatusCode::NOT_FOUND,
            PlatformError::Http(_)
            | PlatformError::Service { .. }
            | PlatformError::Decode(_)
            | PlatformError::UnregisteredToken => StatusCode::BAD_GATEWAY,
        };
        Self::new(status, error.to_string())
    }
}

impl From<RecordError> for ApiError {
    fn from(error: RecordError) -> Self {
        let status = match &error {
            RecordError::NotFound(_) => StatusCode::NOT_FOUND,
            RecordError::InvalidStatus(_) => StatusCode::BAD_REQUEST,
            RecordError::IllegalTransition { .. } => StatusCode::CONFLICT,
            RecordError::Malformed { .. } => {
                error!(error = ?error, "record decode error");
                StatusCode::INTERNAL_SERVER_ERROR
            }
            RecordError::Platform(inner) => return Self::from_platform_nested(inner, &error),
        };
        Self::new(status, error.to_string())
    }
}

impl ApiError {
    fn from_platform_nested(inner: &PlatformError, outer: &RecordError) -> Self {
        error!(error = ?outer, "platform error behind repository");
        let status = match inner {
            PlatformError::InvalidCredentials | PlatformError::InvalidSession => {
                StatusCode::UNAUTHORIZED
            }
            PlatformError::NotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::BAD_GATEWAY,
        };
        Self::new(status, outer.to_string())
    }
}
