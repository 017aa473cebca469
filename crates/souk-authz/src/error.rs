use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthzError {
    // Authorization
    #[error("unauthorized")]
    Unauthorized,

    #[error("authentication failed")]
    AuthenticationFailed,

    #[error("invalid target: {0}")]
    InvalidTarget(String),

    #[error("unknown permission: {0}")]
    UnknownPermission(String),

    // Store
    #[error("not found: {0}")]
    NotFound(String),

    #[error("duplicate: {0}")]
    Duplicate(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("database error: {0}")]
    Database(String),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, AuthzError>;
