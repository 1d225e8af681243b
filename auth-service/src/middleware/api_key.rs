use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use service_core::error::AppError;

use crate::{middleware::RoutePolicy, AppState};

pub const API_KEY_HEADER: &str = "x-api-key";

/// First guard in the chain. Every route requires a known, active api
/// key whose permissions cover the route policy. Failures are uniform
/// so the header does not become a probing oracle.
pub async fn api_key_guard(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let key = req
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
        .ok_or_else(|| AppError::Forbidden(anyhow::anyhow!("Permission denied")))?
        .to_string();

    let api_key = state
        .db
        .find_api_key(&key)
        .await?
        .ok_or_else(|| AppError::Forbidden(anyhow::anyhow!("Permission denied")))?;

    let required = req
        .extensions()
        .get::<RoutePolicy>()
        .map(|policy| policy.permission)
        .unwrap_or(crate::models::GENERAL_PERMISSION);

    if !has_permission(&api_key.permissions, required) {
        tracing::warn!(key_version = api_key.version, "Api key lacks permission");
        return Err(AppError::Forbidden(anyhow::anyhow!("Permission denied")));
    }

    req.extensions_mut().insert(api_key);

    Ok(next.run(req).await)
}

pub fn has_permission(granted: &[String], required: &str) -> bool {
    granted.iter().any(|p| p == required)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn permission_match_is_exact() {
        let granted = vec!["GENERAL".to_string(), "REPORTS".to_string()];
        assert!(has_permission(&granted, "GENERAL"));
        assert!(has_permission(&granted, "REPORTS"));
        assert!(!has_permission(&granted, "ADMIN"));
        assert!(!has_permission(&granted, "general"));
        assert!(!has_permission(&[], "GENERAL"));
    }
}
