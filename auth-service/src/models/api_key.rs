//! ApiKey model - credentials for calling services, independent of any user.

use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// Baseline permission granted to ordinary consumer-facing services. Routes
/// that declare nothing else require this one.
pub const GENERAL_PERMISSION: &str = "GENERAL";

/// Service API key. Carries the coarse permission scopes the calling
/// service is allowed to exercise.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiKey {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub key: String,
    pub version: i32,
    pub permissions: Vec<String>,
    pub comments: Vec<String>,
    #[serde(default = "default_status")]
    pub status: bool,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

fn default_status() -> bool {
    true
}

impl ApiKey {
    pub fn new(key: String, version: i32, permissions: Vec<String>, comments: Vec<String>) -> Self {
        Self {
            id: ObjectId::new(),
            key,
            version,
            permissions,
            comments,
            status: true,
            created_at: Utc::now(),
        }
    }
}
