use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use service_core::error::AppError;

use crate::{
    middleware::{AuthenticatedUser, RoutePolicy},
    models::{Role, RoleCode},
    AppState,
};

/// Third guard in the chain. Opt-in: only runs a check when the route
/// policy names roles. Role codes are resolved against active role
/// records, so a disabled role grants nothing even if a user still
/// references it.
pub async fn role_guard(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let required = match req.extensions().get::<RoutePolicy>() {
        Some(policy) if !policy.roles.is_empty() => policy.roles.clone(),
        _ => return Ok(next.run(req).await),
    };

    let ctx = req
        .extensions()
        .get::<AuthenticatedUser>()
        .cloned()
        .ok_or_else(|| AppError::Forbidden(anyhow::anyhow!("Permission denied")))?;

    let roles = state.db.find_active_roles(&ctx.user.roles).await?;

    if !has_role(&roles, &required) {
        tracing::warn!(user_id = %ctx.user.id, "Role check failed");
        return Err(AppError::Forbidden(anyhow::anyhow!("Permission denied")));
    }

    Ok(next.run(req).await)
}

pub fn has_role(granted: &[Role], required: &[RoleCode]) -> bool {
    granted.iter().any(|role| required.contains(&role.code))
}
