//! User roles on the platform.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Role assigned to a platform account.
///
/// The server is the authority on authorization; clients use the role only
/// to decide which views and operations to offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// Platform administrator: manages users and stores.
    Admin,
    /// Store owner: sees their store's dashboard and ratings.
    Owner,
    /// Regular customer: browses and rates stores.
    User,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Admin => write!(f, "ADMIN"),
            Self::Owner => write!(f, "OWNER"),
            Self::User => write!(f, "USER"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_wire_format() {
        assert_eq!(
            serde_json::to_string(&Role::Admin).expect("serialize"),
            "\"ADMIN\""
        );
        let role: Role = serde_json::from_str("\"OWNER\"").expect("deserialize");
        assert_eq!(role, Role::Owner);
    }

    #[test]
    fn test_role_display() {
        assert_eq!(Role::User.to_string(), "USER");
    }
}
