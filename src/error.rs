use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("not found")]
    NotFound,

    #[error("authentication failed")]
    AuthenticationFailure,

    #[error("not authorized")]
    AuthorizationFailure,

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("daily publication quota exceeded")]
    QuotaExceeded,

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("invalid token format")]
    InvalidTokenFormat,

    #[error("token expired")]
    TokenExpired,

    #[error("restore failed: {0}")]
    Restore(String),

    #[error("upstream hub error: {0}")]
    Upstream(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;
