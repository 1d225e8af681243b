//! Keystore model - server-side session records binding issued token pairs.

use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// One live session. `primary_key` is bound to the access token and
/// `secondary_key` to the refresh token of the same issuance event.
///
/// A record is never mutated after creation: it is read, or deleted.
/// Deleting it invalidates the token pair it was issued with.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Keystore {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub client: ObjectId,
    pub primary_key: String,
    pub secondary_key: String,
    #[serde(default = "default_status")]
    pub status: bool,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

fn default_status() -> bool {
    true
}

impl Keystore {
    pub fn new(client: ObjectId, primary_key: String, secondary_key: String) -> Self {
        Self {
            id: ObjectId::new(),
            client,
            primary_key,
            secondary_key,
            status: true,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_keystore_is_active_and_bound_to_its_client() {
        let client = ObjectId::new();
        let keystore = Keystore::new(client, "primary".to_string(), "secondary".to_string());

        assert!(keystore.status);
        assert_eq!(keystore.client, client);
        assert_ne!(keystore.primary_key, keystore.secondary_key);
    }
}
