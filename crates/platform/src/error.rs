use thiserror::Error;

pub type PlatformResult<T> = Result<T, PlatformError>;

#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("document not found: {0}")]
    NotFound(String),
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("account already exists")]
    AccountExists,
    #[error("session rejected by identity provider")]
    InvalidSession,
    #[error("push token not registered")]
    UnregisteredToken,
    #[error("platform request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("platform responded with status {status}: {message}")]
    Service { status: u16, message: String },
    #[error("malformed platform payload: {0}")]
    Decode(#[from] serde_json::Error),
}

impl PlatformError {
    pub fn service(status: u16, message: impl Into<String>) -> Self {
        Self::Service {
            status,
            message: message.into(),
        }
    }
}
