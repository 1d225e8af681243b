pub mod admin;
pub mod auth;

use serde::Serialize;

/// Body shape for every non-2xx response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
