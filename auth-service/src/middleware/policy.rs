use axum::{
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
    Json,
};

use crate::{
    dtos::ErrorResponse,
    models::{Keystore, RoleCode, User},
    services::TokenPayload,
};

/// Access rules for a route group, attached as an `Extension` layer.
/// The permission gates the api-key check; `roles` is consulted only
/// when non-empty.
#[derive(Debug, Clone)]
pub struct RoutePolicy {
    pub permission: &'static str,
    pub roles: Vec<RoleCode>,
}

impl RoutePolicy {
    pub fn new(permission: &'static str) -> Self {
        Self {
            permission,
            roles: Vec::new(),
        }
    }

    pub fn with_roles(permission: &'static str, roles: Vec<RoleCode>) -> Self {
        Self { permission, roles }
    }
}

impl Default for RoutePolicy {
    fn default() -> Self {
        Self::new(crate::models::GENERAL_PERMISSION)
    }
}

/// Request context established by the access guard. The keystore record
/// is carried along so sign-out can consume exactly this session.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user: User,
    pub keystore: Keystore,
    pub payload: TokenPayload,
}

/// Extractor for handlers behind the access guard.
pub struct AuthUser(pub AuthenticatedUser);

#[axum::async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, Json<ErrorResponse>);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let ctx = parts.extensions.get::<AuthenticatedUser>().ok_or((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: "Auth context missing from request extensions".to_string(),
            }),
        ))?;

        Ok(AuthUser(ctx.clone()))
    }
}
