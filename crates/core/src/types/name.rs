//! Display name type with the platform's length rule.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`UserName`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum UserNameError {
    /// The name is shorter than the platform minimum.
    #[error("name must be at least {min} characters")]
    TooShort {
        /// Minimum allowed length.
        min: usize,
    },
    /// The name exceeds the platform maximum.
    #[error("name must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
}

/// A user's display name.
///
/// The platform requires full names between 20 and 60 characters; the same
/// rule is enforced here so a bad name never reaches the network.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct UserName(String);

impl UserName {
    /// Minimum name length.
    pub const MIN_LENGTH: usize = 20;
    /// Maximum name length.
    pub const MAX_LENGTH: usize = 60;

    /// Parse a `UserName`, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns an error when the trimmed name is outside 20-60 characters.
    pub fn parse(s: &str) -> Result<Self, UserNameError> {
        let trimmed = s.trim();
        let len = trimmed.chars().count();
        if len < Self::MIN_LENGTH {
            return Err(UserNameError::TooShort {
                min: Self::MIN_LENGTH,
            });
        }
        if len > Self::MAX_LENGTH {
            return Err(UserNameError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }
        Ok(Self(trimmed.to_string()))
    }

    /// The name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_length_rules() {
        assert!(UserName::parse("Alexandra Featherington-Smith").is_ok());
        assert!(matches!(
            UserName::parse("Short Name"),
            Err(UserNameError::TooShort { .. })
        ));
        assert!(matches!(
            UserName::parse(&"x".repeat(61)),
            Err(UserNameError::TooLong { .. })
        ));
    }

    #[test]
    fn test_name_trims_whitespace() {
        let name = UserName::parse("  Alexandra Featherington-Smith  ").expect("valid");
        assert_eq!(name.as_str(), "Alexandra Featherington-Smith");
    }
}
