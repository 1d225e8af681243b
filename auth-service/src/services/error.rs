use service_core::error::AppError;
use thiserror::Error;

/// Domain failures raised by the auth flows. Converted to [`AppError`]
/// at the handler boundary, where the HTTP status and instruction
/// header come from.
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Internal error: {0}")]
    InternalString(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),

    #[error("User already registered")]
    AlreadyRegistered,

    #[error("User not found")]
    UserNotFound,

    #[error("User not registered")]
    UserNotRegistered,

    #[error("User credential not set")]
    CredentialNotSet,

    #[error("Authentication failure")]
    AuthenticationFailure,

    #[error("Invalid access token")]
    InvalidAccessToken,

    #[error("Token expired")]
    TokenExpired,
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Internal(e) => AppError::InternalError(e),
            ServiceError::InternalString(e) => AppError::InternalError(anyhow::anyhow!(e)),
            ServiceError::AlreadyRegistered => {
                AppError::Conflict(anyhow::anyhow!("User already registered"))
            }
            ServiceError::UserNotFound => AppError::NotFound(anyhow::anyhow!("User not found")),
            ServiceError::UserNotRegistered => {
                AppError::Unauthorized(anyhow::anyhow!("User not registered"))
            }
            ServiceError::CredentialNotSet => {
                AppError::BadRequest(anyhow::anyhow!("User credential not set"))
            }
            ServiceError::AuthenticationFailure => {
                AppError::Unauthorized(anyhow::anyhow!("Authentication failure"))
            }
            ServiceError::InvalidAccessToken => {
                AppError::Unauthorized(anyhow::anyhow!("Invalid access token"))
            }
            ServiceError::TokenExpired => AppError::TokenExpired,
        }
    }
}
