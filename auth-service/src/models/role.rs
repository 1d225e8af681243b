//! Role model - coarse user-to-feature capability scopes.

use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// Role codes a user can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoleCode {
    Viewer,
    Admin,
    Manager,
}

impl RoleCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoleCode::Viewer => "VIEWER",
            RoleCode::Admin => "ADMIN",
            RoleCode::Manager => "MANAGER",
        }
    }
}

impl std::str::FromStr for RoleCode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "VIEWER" => Ok(RoleCode::Viewer),
            "ADMIN" => Ok(RoleCode::Admin),
            "MANAGER" => Ok(RoleCode::Manager),
            _ => Err(format!("Unknown role code: {}", s)),
        }
    }
}

/// Role entity. Referenced by users through explicit id lists, never owned.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Role {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub code: RoleCode,
    #[serde(default = "default_status")]
    pub status: bool,
}

fn default_status() -> bool {
    true
}

impl Role {
    pub fn new(code: RoleCode) -> Self {
        Self {
            id: ObjectId::new(),
            code,
            status: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn role_codes_round_trip_through_strings() {
        for code in [RoleCode::Viewer, RoleCode::Admin, RoleCode::Manager] {
            assert_eq!(RoleCode::from_str(code.as_str()).unwrap(), code);
        }
        assert!(RoleCode::from_str("SUPERUSER").is_err());
    }
}
