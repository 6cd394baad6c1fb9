//! Custom error types specific to authentication failures.

use thiserror::Error;

use crate::errors::ApiError;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("missing bearer token")]
    MissingToken,

    #[error("unknown or revoked token")]
    InvalidToken,

    #[error("account is deactivated")]
    Inactive,

    #[error("admin role required")]
    AdminRequired,
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::AdminRequired => ApiError::Forbidden,
            _ => ApiError::Unauthorized,
        }
    }
}
