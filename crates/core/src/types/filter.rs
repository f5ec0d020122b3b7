//! List filters and pagination envelopes.
//!
//! Every list endpoint accepts an optional filter; fields left at their
//! defaults are omitted from the query string entirely, matching the server's
//! expectations. Filters also serialize to JSON so the client can fold them
//! into cache keys deterministically.

use serde::{Deserialize, Serialize};

/// Sort direction for list endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

/// Pagination metadata returned alongside list results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    #[serde(default)]
    pub total_pages: u32,
}

/// A page of results from a list endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    #[serde(flatten)]
    pub meta: PageMeta,
}

/// Filter for the admin user listing.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserFilter {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub address: String,
    /// Sort column, e.g. `createdAt` or `name`.
    #[serde(default)]
    pub sort: String,
    #[serde(default)]
    pub order: SortOrder,
}

impl UserFilter {
    /// Query pairs with empty fields omitted.
    #[must_use]
    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        push_nonempty(&mut pairs, "name", &self.name);
        push_nonempty(&mut pairs, "email", &self.email);
        push_nonempty(&mut pairs, "address", &self.address);
        push_nonempty(&mut pairs, "sort", &self.sort);
        pairs.push(("order", self.order.as_str().to_string()));
        pairs
    }
}

/// Filter for the admin store listing.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreFilter {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub sort: String,
    #[serde(default)]
    pub order: SortOrder,
}

impl StoreFilter {
    /// Query pairs with empty fields omitted.
    #[must_use]
    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        push_nonempty(&mut pairs, "name", &self.name);
        push_nonempty(&mut pairs, "address", &self.address);
        push_nonempty(&mut pairs, "sort", &self.sort);
        pairs.push(("order", self.order.as_str().to_string()));
        pairs
    }
}

/// Search parameters for the public store listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreSearch {
    pub page: u32,
    pub limit: u32,
    /// Sort key, e.g. `rating_highest` or `name_asc`.
    pub sort: String,
    #[serde(default)]
    pub search: String,
    #[serde(default)]
    pub address: String,
    /// Ask the server to attach the caller's own rating to each row.
    #[serde(default)]
    pub include_user_ratings: bool,
}

impl Default for StoreSearch {
    fn default() -> Self {
        Self {
            page: 1,
            limit: 10,
            sort: "rating_highest".to_string(),
            search: String::new(),
            address: String::new(),
            include_user_ratings: true,
        }
    }
}

impl StoreSearch {
    /// Query pairs with empty fields omitted.
    #[must_use]
    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("page", self.page.to_string()),
            ("limit", self.limit.to_string()),
            ("sort", self.sort.clone()),
        ];
        push_nonempty(&mut pairs, "search", &self.search);
        push_nonempty(&mut pairs, "address", &self.address);
        if self.include_user_ratings {
            pairs.push(("includeUserRatings", "true".to_string()));
        }
        pairs
    }
}

/// Filter for the owner's rating listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerRatingFilter {
    pub page: u32,
    pub limit: u32,
    /// Sort key, e.g. `date_newest` or `rating_highest`.
    pub sort: String,
    #[serde(default)]
    pub min_rating: u8,
    #[serde(default)]
    pub search: String,
}

impl Default for OwnerRatingFilter {
    fn default() -> Self {
        Self {
            page: 1,
            limit: 10,
            sort: "date_newest".to_string(),
            min_rating: 0,
            search: String::new(),
        }
    }
}

impl OwnerRatingFilter {
    /// Query pairs with empty fields omitted.
    #[must_use]
    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("page", self.page.to_string()),
            ("limit", self.limit.to_string()),
            ("sort", self.sort.clone()),
        ];
        if self.min_rating > 0 {
            pairs.push(("minRating", self.min_rating.to_string()));
        }
        push_nonempty(&mut pairs, "search", &self.search);
        pairs
    }
}

fn push_nonempty(pairs: &mut Vec<(&'static str, String)>, key: &'static str, value: &str) {
    if !value.is_empty() {
        pairs.push((key, value.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_filter_omits_empty_fields() {
        let filter = UserFilter {
            name: "smith".to_string(),
            ..UserFilter::default()
        };
        let pairs = filter.to_query();
        assert!(pairs.contains(&("name", "smith".to_string())));
        assert!(!pairs.iter().any(|(k, _)| *k == "email"));
        assert!(pairs.contains(&("order", "desc".to_string())));
    }

    #[test]
    fn test_store_search_defaults() {
        let search = StoreSearch::default();
        let pairs = search.to_query();
        assert!(pairs.contains(&("page", "1".to_string())));
        assert!(pairs.contains(&("sort", "rating_highest".to_string())));
        assert!(pairs.contains(&("includeUserRatings", "true".to_string())));
        assert!(!pairs.iter().any(|(k, _)| *k == "search"));
    }

    #[test]
    fn test_owner_filter_min_rating_zero_omitted() {
        let filter = OwnerRatingFilter::default();
        assert!(!filter.to_query().iter().any(|(k, _)| *k == "minRating"));

        let filter = OwnerRatingFilter {
            min_rating: 3,
            ..OwnerRatingFilter::default()
        };
        assert!(filter.to_query().contains(&("minRating", "3".to_string())));
    }

    #[test]
    fn test_paginated_flattens_meta() {
        let json = r#"{
            "items": [1, 2, 3],
            "page": 1,
            "limit": 10,
            "total": 3,
            "totalPages": 1
        }"#;
        let page: Paginated<i64> = serde_json::from_str(json).expect("deserialize");
        assert_eq!(page.items.len(), 3);
        assert_eq!(page.meta.total, 3);
    }
}
