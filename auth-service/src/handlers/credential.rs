use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use service_core::error::AppError;
use std::str::FromStr;

use crate::{
    dtos::{
        admin::{ApiKeyResponse, CreateApiKeyRequest, CreateRoleRequest},
        auth::MessageResponse,
    },
    models::{ApiKey, Role, RoleCode, GENERAL_PERMISSION},
    services::generate_token_key,
    utils::ValidatedJson,
    AppState,
};

pub async fn create_api_key(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<CreateApiKeyRequest>,
) -> Result<impl IntoResponse, AppError> {
    let permissions = req
        .permissions
        .filter(|p| !p.is_empty())
        .unwrap_or_else(|| vec![GENERAL_PERMISSION.to_string()]);

    let api_key = ApiKey::new(
        generate_token_key(),
        1,
        permissions,
        req.comments.unwrap_or_default(),
    );
    state.db.insert_api_key(&api_key).await?;

    tracing::info!(key_version = api_key.version, "Api key created");

    Ok((StatusCode::CREATED, Json(ApiKeyResponse::from(api_key))))
}

pub async fn delete_api_key(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let deleted = state.db.delete_api_key(&key).await?;
    if deleted == 0 {
        return Err(AppError::NotFound(anyhow::anyhow!("Api key not found")));
    }

    Ok((
        StatusCode::OK,
        Json(MessageResponse {
            message: "Api key deleted".to_string(),
        }),
    ))
}

pub async fn create_role(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<CreateRoleRequest>,
) -> Result<impl IntoResponse, AppError> {
    let code = RoleCode::from_str(&req.code)
        .map_err(|e| AppError::BadRequest(anyhow::anyhow!(e)))?;

    if state.db.find_role_by_code(code).await?.is_some() {
        return Err(AppError::Conflict(anyhow::anyhow!("Role already exists")));
    }

    let role = Role::new(code);
    state.db.insert_role(&role).await?;

    tracing::info!(code = code.as_str(), "Role created");

    Ok((StatusCode::CREATED, Json(role)))
}

pub async fn delete_role(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let code =
        RoleCode::from_str(&code).map_err(|e| AppError::BadRequest(anyhow::anyhow!(e)))?;

    let deleted = state.db.delete_role_by_code(code).await?;
    if deleted == 0 {
        return Err(AppError::NotFound(anyhow::anyhow!("Role not found")));
    }

    Ok((
        StatusCode::OK,
        Json(MessageResponse {
            message: "Role deleted".to_string(),
        }),
    ))
}
