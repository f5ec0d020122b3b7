//! Cache keys.
//!
//! A key is an ordered list of segments, e.g. `admin/users/{…params…}`.
//! Invalidation works on prefixes: invalidating `["admin", "users"]` hits
//! every parameterized variant of the user listing.

use core::fmt;

use serde::Serialize;

/// Key identifying one cached resource.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QueryKey(Vec<String>);

impl QueryKey {
    /// Build a key from string segments.
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(segments.into_iter().map(Into::into).collect())
    }

    /// Append a segment.
    #[must_use]
    pub fn push(mut self, segment: impl Into<String>) -> Self {
        self.0.push(segment.into());
        self
    }

    /// Append a parameter struct as a canonical JSON segment.
    ///
    /// Two filters with equal field values always produce the same key.
    #[must_use]
    pub fn with_params<P: Serialize>(self, params: &P) -> Self {
        let segment =
            serde_json::to_string(params).unwrap_or_else(|_| "<unserializable>".to_string());
        self.push(segment)
    }

    /// Whether `prefix` is a leading subsequence of this key.
    #[must_use]
    pub fn starts_with(&self, prefix: &Self) -> bool {
        self.0.len() >= prefix.0.len()
            && self.0.iter().zip(prefix.0.iter()).all(|(a, b)| a == b)
    }

    /// The key's segments.
    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.0
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join("/"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_matching() {
        let key = QueryKey::new(["admin", "users"]).push("{\"name\":\"smith\"}");
        assert!(key.starts_with(&QueryKey::new(["admin"])));
        assert!(key.starts_with(&QueryKey::new(["admin", "users"])));
        assert!(key.starts_with(&key));
        assert!(!key.starts_with(&QueryKey::new(["admin", "stores"])));
        assert!(!QueryKey::new(["admin"]).starts_with(&key));
    }

    #[test]
    fn test_params_are_deterministic() {
        #[derive(Serialize)]
        struct Filter {
            name: String,
            page: u32,
        }

        let a = QueryKey::new(["public", "stores"]).with_params(&Filter {
            name: "bakery".to_string(),
            page: 1,
        });
        let b = QueryKey::new(["public", "stores"]).with_params(&Filter {
            name: "bakery".to_string(),
            page: 1,
        });
        assert_eq!(a, b);

        let c = QueryKey::new(["public", "stores"]).with_params(&Filter {
            name: "bakery".to_string(),
            page: 2,
        });
        assert_ne!(a, c);
    }

    #[test]
    fn test_display_joins_segments() {
        let key = QueryKey::new(["owner", "dashboard"]);
        assert_eq!(key.to_string(), "owner/dashboard");
    }
}
