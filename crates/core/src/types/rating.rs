//! Rating DTO and the validated 1-5 rating value.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single user's rating of a store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rating {
    pub id: i64,
    #[serde(default)]
    pub store_id: Option<i64>,
    #[serde(default)]
    pub user_id: Option<i64>,
    /// Rating value, 1 through 5. The server rejects anything else; clients
    /// should construct values through [`RatingValue`].
    pub value: u8,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    /// Name of the rating user; present in owner-facing listings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
}

/// Errors that can occur when constructing a [`RatingValue`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RatingValueError {
    /// The value is outside the 1-5 range.
    #[error("rating must be between 1 and 5, got {0}")]
    OutOfRange(u8),
}

/// A star rating, constrained to 1 through 5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RatingValue(u8);

impl RatingValue {
    /// Construct a rating value, rejecting anything outside 1-5.
    ///
    /// # Errors
    ///
    /// Returns [`RatingValueError::OutOfRange`] for 0 or values above 5.
    pub const fn new(value: u8) -> Result<Self, RatingValueError> {
        if matches!(value, 1..=5) {
            Ok(Self(value))
        } else {
            Err(RatingValueError::OutOfRange(value))
        }
    }

    /// The raw value, guaranteed 1-5.
    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }
}

impl core::fmt::Display for RatingValue {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rating_value_bounds() {
        assert!(RatingValue::new(1).is_ok());
        assert!(RatingValue::new(5).is_ok());
        assert_eq!(RatingValue::new(0), Err(RatingValueError::OutOfRange(0)));
        assert_eq!(RatingValue::new(6), Err(RatingValueError::OutOfRange(6)));
    }

    #[test]
    fn test_rating_deserializes() {
        let json = r#"{
            "id": 42,
            "storeId": 3,
            "userId": 7,
            "value": 4,
            "comment": "Great service",
            "createdAt": "2025-06-10T08:30:00Z"
        }"#;

        let rating: Rating = serde_json::from_str(json).expect("deserialize");
        assert_eq!(rating.value, 4);
        assert_eq!(rating.comment.as_deref(), Some("Great service"));
    }
}
