use axum::{
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Response header telling clients how to recover from an auth failure:
/// `refresh_token` when the access token merely expired, `logout` when the
/// token or its session is no longer acceptable.
pub const INSTRUCTION_HEADER: &str = "instruction";

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Bad request: {0}")]
    BadRequest(anyhow::Error),

    #[error("Not found: {0}")]
    NotFound(anyhow::Error),

    #[error("Unauthorized: {0}")]
    Unauthorized(anyhow::Error),

    #[error("Forbidden: {0}")]
    Forbidden(anyhow::Error),

    #[error("Conflict: {0}")]
    Conflict(anyhow::Error),

    #[error("Token expired")]
    TokenExpired,

    #[error("Too many requests: {0}")]
    TooManyRequests(String, Option<u64>),

    #[error("Database error: {0}")]
    DatabaseError(anyhow::Error),

    #[error("Configuration error: {0}")]
    ConfigError(anyhow::Error),

    #[error("Internal server error: {0}")]
    InternalError(#[from] anyhow::Error),
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::ConfigError(anyhow::Error::new(err))
    }
}

impl From<mongodb::error::Error> for AppError {
    fn from(err: mongodb::error::Error) -> Self {
        AppError::DatabaseError(anyhow::Error::new(err))
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::InternalError(anyhow::Error::new(err))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        #[derive(Serialize)]
        struct ErrorResponse {
            error: String,
            #[serde(skip_serializing_if = "Option::is_none")]
            details: Option<String>,
        }

        let (status, error_message, details, instruction, retry_after) = match self {
            AppError::ValidationError(err) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "Validation error".to_string(),
                Some(err.to_string()),
                None,
                None,
            ),
            AppError::BadRequest(err) => {
                (StatusCode::BAD_REQUEST, err.to_string(), None, None, None)
            }
            AppError::NotFound(err) => (StatusCode::NOT_FOUND, err.to_string(), None, None, None),
            AppError::Unauthorized(err) => {
                let message = err.to_string();
                // Clients must force a full re-login when the access token or
                // its session has been invalidated.
                let instruction = message
                    .to_lowercase()
                    .contains("invalid access token")
                    .then_some("logout");
                (StatusCode::UNAUTHORIZED, message, None, instruction, None)
            }
            AppError::Forbidden(err) => (StatusCode::FORBIDDEN, err.to_string(), None, None, None),
            AppError::Conflict(err) => (StatusCode::CONFLICT, err.to_string(), None, None, None),
            AppError::TokenExpired => (
                StatusCode::UNAUTHORIZED,
                "Token Expired".to_string(),
                None,
                Some("refresh_token"),
                None,
            ),
            AppError::TooManyRequests(msg, retry) => {
                (StatusCode::TOO_MANY_REQUESTS, msg, None, None, retry)
            }
            AppError::DatabaseError(err) => {
                tracing::error!(error = %err, "Database error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                    None,
                    None,
                    None,
                )
            }
            AppError::ConfigError(err) => {
                tracing::error!(error = %err, "Configuration error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                    None,
                    None,
                    None,
                )
            }
            AppError::InternalError(err) => {
                tracing::error!(error = %err, "Internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                    None,
                    None,
                    None,
                )
            }
        };

        let mut response = (
            status,
            Json(ErrorResponse {
                error: error_message,
                details,
            }),
        )
            .into_response();

        if let Some(instruction) = instruction {
            response
                .headers_mut()
                .insert(INSTRUCTION_HEADER, HeaderValue::from_static(instruction));
        }
        if let Some(retry_after) = retry_after {
            if let Ok(value) = HeaderValue::from_str(&retry_after.to_string()) {
                response.headers_mut().insert("retry-after", value);
            }
        }

        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expired_token_maps_to_401_with_refresh_instruction() {
        let response = AppError::TokenExpired.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.headers().get(INSTRUCTION_HEADER).unwrap(),
            "refresh_token"
        );
    }

    #[test]
    fn invalid_access_token_maps_to_401_with_logout_instruction() {
        let response =
            AppError::Unauthorized(anyhow::anyhow!("Invalid Access Token")).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(response.headers().get(INSTRUCTION_HEADER).unwrap(), "logout");
    }

    #[test]
    fn other_unauthorized_failures_carry_no_instruction() {
        let response =
            AppError::Unauthorized(anyhow::anyhow!("Authentication failure")).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(response.headers().get(INSTRUCTION_HEADER).is_none());
    }

    #[test]
    fn internal_detail_is_suppressed() {
        let response =
            AppError::InternalError(anyhow::anyhow!("pool exhausted: secret dsn")).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn taxonomy_status_codes() {
        let cases = [
            (
                AppError::BadRequest(anyhow::anyhow!("x")),
                StatusCode::BAD_REQUEST,
            ),
            (
                AppError::NotFound(anyhow::anyhow!("x")),
                StatusCode::NOT_FOUND,
            ),
            (
                AppError::Forbidden(anyhow::anyhow!("x")),
                StatusCode::FORBIDDEN,
            ),
            (
                AppError::Conflict(anyhow::anyhow!("x")),
                StatusCode::CONFLICT,
            ),
            (
                AppError::TooManyRequests("x".to_string(), None),
                StatusCode::TOO_MANY_REQUESTS,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(err.into_response().status(), status);
        }
    }
}
