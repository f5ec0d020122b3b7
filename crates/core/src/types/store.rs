//! Store DTO.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::rating::Rating;

/// A store listing as returned by the API.
///
/// Public listings carry the aggregate rating computed server-side, and,
/// when the caller is authenticated, the caller's own rating for the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Store {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    pub address: String,
    /// Server-computed average of all ratings, 0.0 when unrated.
    #[serde(default)]
    pub average_rating: f64,
    #[serde(default)]
    pub rating_count: u64,
    #[serde(default)]
    pub owner_id: Option<i64>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    /// The requesting user's own rating, when one exists and the listing was
    /// requested with user ratings included.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_rating: Option<Rating>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_deserializes_listing_row() {
        let json = r#"{
            "id": 3,
            "name": "Corner Bakery",
            "address": "1 Main St",
            "averageRating": 4.2,
            "ratingCount": 17
        }"#;

        let store: Store = serde_json::from_str(json).expect("deserialize");
        assert_eq!(store.id, 3);
        assert!((store.average_rating - 4.2).abs() < f64::EPSILON);
        assert_eq!(store.rating_count, 17);
        assert!(store.user_rating.is_none());
    }
}
