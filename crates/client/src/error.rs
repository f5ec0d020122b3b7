//! Client error types.
//!
//! [`ApiError`] is the single error currency between the transport adapter,
//! the query cache, and consumers. It is deliberately `Clone`: when several
//! callers are de-duplicated onto one in-flight fetch, the terminal error is
//! fanned out to every waiter.

use thiserror::Error;

/// Errors surfaced by the Ratehub API client.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// The request never produced a response (DNS, connect, timeout).
    #[error("network error: {0}")]
    Transport(String),

    /// The server answered with a non-2xx status and a message.
    #[error("{message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Server-provided message, shown to the user verbatim.
        message: String,
    },

    /// 404 from the server. Most callers treat this as an error; the rating
    /// lookup treats it as a normal "no data" outcome via
    /// [`QueryCache::fetch_optional`](crate::cache::QueryCache::fetch_optional).
    #[error("not found: {0}")]
    NotFound(String),

    /// The response body was not the JSON we expected.
    #[error("failed to parse response: {0}")]
    Parse(String),

    /// An operation that requires a session was attempted without one.
    #[error("not logged in")]
    NotAuthenticated,

    /// Client-internal failure (interrupted fetch, cache misuse).
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    /// HTTP status of a server-reported error, when there is one.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::NotFound(_) => Some(404),
            _ => None,
        }
    }

    /// Whether this error is the not-found outcome.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Whether a retry could plausibly succeed. Transport failures and 5xx
    /// responses are retryable; client errors (4xx) are not.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(_) => true,
            Self::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_display_uses_server_message() {
        let err = ApiError::Api {
            status: 400,
            message: "Rating must be between 1 and 5".to_string(),
        };
        assert_eq!(err.to_string(), "Rating must be between 1 and 5");
        assert_eq!(err.status(), Some(400));
    }

    #[test]
    fn test_retryability() {
        assert!(ApiError::Transport("connection refused".to_string()).is_retryable());
        assert!(
            ApiError::Api {
                status: 502,
                message: "bad gateway".to_string()
            }
            .is_retryable()
        );
        assert!(
            !ApiError::Api {
                status: 401,
                message: "unauthorized".to_string()
            }
            .is_retryable()
        );
        assert!(!ApiError::NotFound("rating".to_string()).is_retryable());
    }

    #[test]
    fn test_not_found_status() {
        let err = ApiError::NotFound("store 9".to_string());
        assert!(err.is_not_found());
        assert_eq!(err.status(), Some(404));
    }
}
