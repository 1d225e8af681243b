use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use mongodb::bson::oid::ObjectId;
use service_core::error::AppError;

use crate::{
    middleware::AuthenticatedUser,
    services::{payload_is_valid, TokenError},
    AppState,
};

/// Second guard in the chain. Verifies the bearer token, pins its
/// claims, loads the user, and proves the session is still live by
/// finding the keystore record the token's `prm` points at.
pub async fn access_guard(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = extract_bearer(req.headers())
        .ok_or_else(|| AppError::Unauthorized(anyhow::anyhow!("Invalid Authorization")))?
        .to_string();

    let payload = state.jwt.verify(&token).map_err(|e| match e {
        TokenError::Expired => AppError::TokenExpired,
        TokenError::Invalid => AppError::Unauthorized(anyhow::anyhow!("Invalid access token")),
    })?;

    if !payload_is_valid(&payload, &state.config.token.issuer, &state.config.token.audience) {
        return Err(AppError::Unauthorized(anyhow::anyhow!(
            "Invalid access token"
        )));
    }

    // payload_is_valid already proved sub parses
    let user_id = ObjectId::parse_str(&payload.sub)
        .map_err(|_| AppError::Unauthorized(anyhow::anyhow!("Invalid access token")))?;

    let user = state
        .db
        .find_user_by_id(user_id)
        .await?
        .ok_or_else(|| AppError::Unauthorized(anyhow::anyhow!("User not registered")))?;

    let keystore = state
        .db
        .find_keystore(user.id, &payload.prm)
        .await?
        .ok_or_else(|| AppError::Unauthorized(anyhow::anyhow!("Invalid access token")))?;

    req.extensions_mut().insert(AuthenticatedUser {
        user,
        keystore,
        payload,
    });

    Ok(next.run(req).await)
}

pub fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .filter(|token| !token.is_empty())
}
