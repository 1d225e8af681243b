use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::{Role, User};

#[derive(Debug, Deserialize, Validate)]
pub struct SignUpBasicRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 6, max = 100, message = "Password must be 6 to 100 characters"))]
    pub password: String,

    #[validate(length(min = 2, max = 200, message = "Name must be 2 to 200 characters"))]
    pub name: String,

    #[validate(url(message = "Invalid profile picture url"))]
    pub profile_pic_url: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct SignInBasicRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// The expired access token travels in the Authorization header; only
/// the refresh token rides in the body.
#[derive(Debug, Deserialize, Validate)]
pub struct TokenRefreshRequest {
    #[validate(length(min = 1, max = 1000, message = "Refresh token must be 1 to 1000 characters"))]
    pub refresh_token: String,
}

#[derive(Debug, Serialize)]
pub struct RoleResponse {
    pub id: String,
    pub code: String,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_pic_url: Option<String>,
    pub roles: Vec<RoleResponse>,
    pub verified: bool,
}

impl UserResponse {
    pub fn from_user(user: &User, roles: Vec<Role>) -> Self {
        Self {
            id: user.id.to_hex(),
            name: user.name.clone(),
            email: user.email.clone(),
            profile_pic_url: user.profile_pic_url.clone(),
            roles: roles
                .into_iter()
                .map(|r| RoleResponse {
                    id: r.id.to_hex(),
                    code: r.code.as_str().to_string(),
                })
                .collect(),
            verified: user.verified,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TokensResponse {
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user: UserResponse,
    pub tokens: TokensResponse,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}
