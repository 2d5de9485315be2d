use homeboy_platform::PlatformError;
use thiserror::Error;

pub type RecordResult<T> = Result<T, RecordError>;

#[derive(Debug, Error)]
pub enum RecordError {
    #[error("{0} not found")]
    NotFound(String),
    #[error("invalid status value: {0}")]
    InvalidStatus(String),
    #[error("illegal status transition: {from} -> {to}")]
    IllegalTransition { from: String, to: String },
    #[error("malformed document {collection}/{id}: {message}")]
    Malformed {
        collection: String,
        id: String,
        message: String,
    },
    #[error(transparent)]
    Platform(#[from] PlatformError),
}
