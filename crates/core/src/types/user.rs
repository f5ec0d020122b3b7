//! User account DTO.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::role::Role;

/// A platform account as returned by the API.
///
/// Owned by the server; clients hold it only as long as the cache does.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub address: Option<String>,
    pub role: Role,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    /// Average rating of the owned store; present only for `OWNER` rows in
    /// the admin user listing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store_rating: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_deserializes_camel_case() {
        let json = r#"{
            "id": 7,
            "name": "Alexandra Featherington-Smith",
            "email": "alex@example.com",
            "address": "12 High Street",
            "role": "USER",
            "createdAt": "2025-05-01T10:00:00Z"
        }"#;

        let user: User = serde_json::from_str(json).expect("deserialize");
        assert_eq!(user.id, 7);
        assert_eq!(user.role, Role::User);
        assert!(user.created_at.is_some());
        assert!(user.store_rating.is_none());
    }

    #[test]
    fn test_user_tolerates_missing_optionals() {
        let json = r#"{"id": 1, "name": "n", "email": "e@x.com", "role": "ADMIN"}"#;
        let user: User = serde_json::from_str(json).expect("deserialize");
        assert!(user.address.is_none());
        assert!(user.created_at.is_none());
    }
}
