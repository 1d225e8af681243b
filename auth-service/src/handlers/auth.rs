use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use service_core::error::AppError;

use crate::{
    dtos::auth::{MessageResponse, SignInBasicRequest, SignUpBasicRequest, TokenRefreshRequest},
    middleware::{extract_bearer, AuthUser},
    utils::ValidatedJson,
    AppState,
};

pub async fn signup_basic(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<SignUpBasicRequest>,
) -> Result<impl IntoResponse, AppError> {
    let res = state.auth.sign_up_basic(req).await?;
    Ok((StatusCode::CREATED, Json(res)))
}

pub async fn signin_basic(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<SignInBasicRequest>,
) -> Result<impl IntoResponse, AppError> {
    let res = state.auth.sign_in_basic(req).await?;
    Ok((StatusCode::OK, Json(res)))
}

pub async fn signout(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<impl IntoResponse, AppError> {
    state.auth.sign_out(&user.0.keystore).await?;
    Ok((
        StatusCode::OK,
        Json(MessageResponse {
            message: "Logout success".to_string(),
        }),
    ))
}

pub async fn signout_everywhere(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<impl IntoResponse, AppError> {
    state.auth.sign_out_everywhere(&user.0.user).await?;
    Ok((
        StatusCode::OK,
        Json(MessageResponse {
            message: "Logout success".to_string(),
        }),
    ))
}

/// The expired access token arrives as the bearer credential; it is not
/// behind the access guard because it no longer verifies.
pub async fn token_refresh(
    State(state): State<AppState>,
    headers: HeaderMap,
    ValidatedJson(req): ValidatedJson<TokenRefreshRequest>,
) -> Result<impl IntoResponse, AppError> {
    let access_token = extract_bearer(&headers)
        .ok_or_else(|| AppError::Unauthorized(anyhow::anyhow!("Invalid Authorization")))?;

    let tokens = state
        .auth
        .refresh_tokens(access_token, &req.refresh_token)
        .await?;

    Ok((StatusCode::OK, Json(tokens)))
}
