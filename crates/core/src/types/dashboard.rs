//! Dashboard DTOs for the admin and owner views.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Platform-wide counters shown on the admin dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminDashboard {
    pub total_users: u64,
    pub total_stores: u64,
    pub total_ratings: u64,
}

/// A user who rated the owner's store, as shown on the owner dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RaterSummary {
    pub user_id: i64,
    pub name: String,
    pub value: u8,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Aggregates for the store owner's dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerDashboard {
    pub store_id: i64,
    pub store_name: String,
    #[serde(default)]
    pub average_rating: f64,
    #[serde(default)]
    pub total_ratings: u64,
    #[serde(default)]
    pub recent_raters: Vec<RaterSummary>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_dashboard_round_trip() {
        let json = r#"{"totalUsers": 10, "totalStores": 4, "totalRatings": 31}"#;
        let dash: AdminDashboard = serde_json::from_str(json).expect("deserialize");
        assert_eq!(dash.total_ratings, 31);
    }

    #[test]
    fn test_owner_dashboard_defaults() {
        let json = r#"{"storeId": 2, "storeName": "Corner Bakery"}"#;
        let dash: OwnerDashboard = serde_json::from_str(json).expect("deserialize");
        assert_eq!(dash.total_ratings, 0);
        assert!(dash.recent_raters.is_empty());
    }
}
