//! User model - accounts owned by the user directory.

use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// User entity. Soft-deleted by flipping `status`; this subsystem never
/// removes user documents.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub email: String,
    /// Argon2 hash. Absent for accounts provisioned without a password
    /// credential.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_pic_url: Option<String>,
    /// Explicit foreign keys into the role directory; resolved with a
    /// separate fetch at the point of use.
    #[serde(default)]
    pub roles: Vec<ObjectId>,
    #[serde(default)]
    pub verified: bool,
    #[serde(default = "default_status")]
    pub status: bool,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

fn default_status() -> bool {
    true
}

impl User {
    pub fn new(
        email: String,
        password_hash: String,
        name: String,
        profile_pic_url: Option<String>,
        default_role: ObjectId,
    ) -> Self {
        Self {
            id: ObjectId::new(),
            name: Some(name),
            email,
            password: Some(password_hash),
            profile_pic_url,
            roles: vec![default_role],
            verified: false,
            status: true,
            created_at: Utc::now(),
        }
    }
}
