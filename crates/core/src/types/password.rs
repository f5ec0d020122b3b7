//! Password type with the platform's complexity rules.

use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::ser::Serializer;

/// Errors that can occur when validating a [`Password`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PasswordError {
    /// The password is shorter than 8 characters.
    #[error("password must be at least {min} characters")]
    TooShort {
        /// Minimum allowed length.
        min: usize,
    },
    /// The password is longer than 16 characters.
    #[error("password must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// No uppercase letter present.
    #[error("password must contain an uppercase letter")]
    MissingUppercase,
    /// No special character present.
    #[error("password must contain a special character")]
    MissingSpecial,
}

/// A password that satisfies the platform's complexity rules:
/// 8-16 characters with at least one uppercase letter and one special
/// character.
///
/// The value is held as a [`SecretString`] and never appears in `Debug`
/// output. Serialization exposes the secret deliberately, for request
/// bodies only.
#[derive(Debug, Clone)]
pub struct Password(SecretString);

impl Password {
    /// Minimum password length.
    pub const MIN_LENGTH: usize = 8;
    /// Maximum password length.
    pub const MAX_LENGTH: usize = 16;

    /// Validate and wrap a password.
    ///
    /// # Errors
    ///
    /// Returns the first violated rule: length bounds, then uppercase, then
    /// special character.
    pub fn parse(s: &str) -> Result<Self, PasswordError> {
        let len = s.chars().count();
        if len < Self::MIN_LENGTH {
            return Err(PasswordError::TooShort {
                min: Self::MIN_LENGTH,
            });
        }
        if len > Self::MAX_LENGTH {
            return Err(PasswordError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }
        if !s.chars().any(char::is_uppercase) {
            return Err(PasswordError::MissingUppercase);
        }
        if !s.chars().any(|c| !c.is_alphanumeric()) {
            return Err(PasswordError::MissingSpecial);
        }
        Ok(Self(SecretString::from(s.to_string())))
    }

    /// Expose the password for inclusion in a request body.
    #[must_use]
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

impl Serialize for Password {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.0.expose_secret())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_rules() {
        assert!(Password::parse("Valid@123").is_ok());
        assert!(matches!(
            Password::parse("Sh@rt1"),
            Err(PasswordError::TooShort { .. })
        ));
        assert!(matches!(
            Password::parse("Toolong@Password123"),
            Err(PasswordError::TooLong { .. })
        ));
        assert!(matches!(
            Password::parse("nouppercase@1"),
            Err(PasswordError::MissingUppercase)
        ));
        assert!(matches!(
            Password::parse("NoSpecial123"),
            Err(PasswordError::MissingSpecial)
        ));
    }

    #[test]
    fn test_password_debug_redacts() {
        let password = Password::parse("Valid@123").expect("valid");
        let debug = format!("{password:?}");
        assert!(!debug.contains("Valid@123"));
    }
}
