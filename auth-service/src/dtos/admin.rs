use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::ApiKey;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateApiKeyRequest {
    /// Defaults to the GENERAL permission when omitted.
    pub permissions: Option<Vec<String>>,

    #[validate(length(max = 10, message = "At most 10 comments"))]
    pub comments: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
pub struct ApiKeyResponse {
    pub key: String,
    pub version: i32,
    pub permissions: Vec<String>,
    pub comments: Vec<String>,
    pub status: bool,
}

impl From<ApiKey> for ApiKeyResponse {
    fn from(api_key: ApiKey) -> Self {
        Self {
            key: api_key.key,
            version: api_key.version,
            permissions: api_key.permissions,
            comments: api_key.comments,
            status: api_key.status,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateRoleRequest {
    #[validate(length(min = 1, message = "Role code is required"))]
    pub code: String,
}
