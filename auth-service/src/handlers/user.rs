use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use service_core::error::AppError;

use crate::{dtos::auth::UserResponse, middleware::AuthUser, AppState};

pub async fn my_profile(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let ctx = user.0;
    let roles = state.db.find_active_roles(&ctx.user.roles).await?;
    Ok((
        StatusCode::OK,
        Json(UserResponse::from_user(&ctx.user, roles)),
    ))
}
