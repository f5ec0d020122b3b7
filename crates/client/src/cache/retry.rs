//! Bounded retry policy for queries.

use std::time::Duration;

use crate::error::ApiError;

/// How many times, and how eagerly, a failed fetch is retried.
///
/// Only transport failures and 5xx responses are ever retried; a 4xx tells
/// us the request itself is wrong and repeating it won't help. Auth and
/// rating-lookup queries use [`RetryPolicy::none`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum number of retries after the initial attempt.
    pub max_retries: u32,
    /// Delay between attempts.
    pub delay: Duration,
}

impl RetryPolicy {
    /// No retries: the first failure is terminal.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            max_retries: 0,
            delay: Duration::ZERO,
        }
    }

    /// A custom policy.
    #[must_use]
    pub const fn new(max_retries: u32, delay: Duration) -> Self {
        Self { max_retries, delay }
    }

    /// Whether `error` should be retried after `attempt` failures so far.
    #[must_use]
    pub const fn should_retry(&self, attempt: u32, error: &ApiError) -> bool {
        attempt < self.max_retries && error.is_retryable()
    }
}

impl Default for RetryPolicy {
    /// Three retries, half a second apart.
    fn default() -> Self {
        Self {
            max_retries: 3,
            delay: Duration::from_millis(500),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_none_never_retries() {
        let policy = RetryPolicy::none();
        let err = ApiError::Transport("connection reset".to_string());
        assert!(!policy.should_retry(0, &err));
    }

    #[test]
    fn test_default_retries_transport_errors() {
        let policy = RetryPolicy::default();
        let err = ApiError::Transport("connection reset".to_string());
        assert!(policy.should_retry(0, &err));
        assert!(policy.should_retry(2, &err));
        assert!(!policy.should_retry(3, &err));
    }

    #[test]
    fn test_client_errors_are_terminal() {
        let policy = RetryPolicy::default();
        let err = ApiError::Api {
            status: 401,
            message: "unauthorized".to_string(),
        };
        assert!(!policy.should_retry(0, &err));
    }
}
