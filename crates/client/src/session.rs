//! Session store: the process-wide holder of the auth token.
//!
//! The token is the only client state that survives restarts. It is written
//! to a JSON file on every [`SessionStore::set_token`] and removed on
//! [`SessionStore::clear_token`], mirroring durable browser storage under a
//! fixed key. Reads are synchronous so the HTTP adapter can attach the
//! bearer header without awaiting.
//!
//! Clearing the token must always be paired with a cache reset; use
//! [`RatehubClient::logout`](crate::RatehubClient::logout) rather than
//! calling [`SessionStore::clear_token`] directly.

use std::path::PathBuf;
use std::sync::{Arc, PoisonError, RwLock};

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

/// Holder of the current bearer token.
///
/// Cheap to clone; all clones share the same state.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    token: RwLock<Option<SecretString>>,
    path: Option<PathBuf>,
}

/// On-disk shape of the persisted session.
#[derive(Serialize, Deserialize)]
struct PersistedSession {
    token: String,
}

impl SessionStore {
    /// Create a session store, restoring any token persisted at `path`.
    ///
    /// A missing or unreadable file simply means logged out; it is never an
    /// error. `None` disables persistence entirely.
    #[must_use]
    pub fn load(path: Option<PathBuf>) -> Self {
        let token = path.as_deref().and_then(|p| {
            let raw = std::fs::read_to_string(p).ok()?;
            match serde_json::from_str::<PersistedSession>(&raw) {
                Ok(persisted) => Some(SecretString::from(persisted.token)),
                Err(e) => {
                    tracing::warn!(path = %p.display(), error = %e, "ignoring corrupt session file");
                    None
                }
            }
        });

        Self {
            inner: Arc::new(SessionInner {
                token: RwLock::new(token),
                path,
            }),
        }
    }

    /// An in-memory-only session store (tests, ephemeral use).
    #[must_use]
    pub fn ephemeral() -> Self {
        Self::load(None)
    }

    /// Store a new token and persist it.
    ///
    /// Visible to all consumers as soon as this returns. Persistence
    /// failures are logged and do not fail the login; the session simply
    /// won't survive a restart.
    pub fn set_token(&self, token: &str) {
        *self
            .inner
            .token
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(SecretString::from(token.to_string()));

        if let Some(path) = &self.inner.path {
            let persisted = PersistedSession {
                token: token.to_string(),
            };
            let write = || -> std::io::Result<()> {
                if let Some(parent) = path.parent() {
                    std::fs::create_dir_all(parent)?;
                }
                let body = serde_json::to_string(&persisted)
                    .map_err(|e| std::io::Error::other(e.to_string()))?;
                std::fs::write(path, body)
            };
            if let Err(e) = write() {
                tracing::warn!(path = %path.display(), error = %e, "failed to persist session");
            }
        }
    }

    /// Drop the token and delete the persisted copy.
    pub fn clear_token(&self) {
        *self
            .inner
            .token
            .write()
            .unwrap_or_else(PoisonError::into_inner) = None;

        if let Some(path) = &self.inner.path
            && let Err(e) = std::fs::remove_file(path)
            && e.kind() != std::io::ErrorKind::NotFound
        {
            tracing::warn!(path = %path.display(), error = %e, "failed to remove session file");
        }
    }

    /// The current token, if logged in.
    #[must_use]
    pub fn token(&self) -> Option<SecretString> {
        self.inner
            .token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// The `Authorization` header value, when a session exists.
    #[must_use]
    pub fn bearer(&self) -> Option<String> {
        self.token()
            .map(|token| format!("Bearer {}", token.expose_secret()))
    }

    /// Whether a token is currently held.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.inner
            .token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("token", &"[REDACTED]")
            .field("path", &self.inner.path)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("ratehub-session-test-{name}-{}", std::process::id()))
    }

    #[test]
    fn test_set_and_clear_token() {
        let session = SessionStore::ephemeral();
        assert!(!session.is_authenticated());

        session.set_token("abc123");
        assert!(session.is_authenticated());
        assert_eq!(session.bearer().as_deref(), Some("Bearer abc123"));

        session.clear_token();
        assert!(!session.is_authenticated());
        assert!(session.bearer().is_none());
    }

    #[test]
    fn test_token_survives_reload() {
        let path = temp_path("reload");
        let session = SessionStore::load(Some(path.clone()));
        session.set_token("persisted-token");

        let reloaded = SessionStore::load(Some(path.clone()));
        assert_eq!(
            reloaded.bearer().as_deref(),
            Some("Bearer persisted-token")
        );

        reloaded.clear_token();
        let after_logout = SessionStore::load(Some(path));
        assert!(!after_logout.is_authenticated());
    }

    #[test]
    fn test_corrupt_session_file_means_logged_out() {
        let path = temp_path("corrupt");
        std::fs::write(&path, "not json at all").expect("write");

        let session = SessionStore::load(Some(path.clone()));
        assert!(!session.is_authenticated());
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn test_debug_redacts_token() {
        let session = SessionStore::ephemeral();
        session.set_token("super-secret");
        let debug = format!("{session:?}");
        assert!(!debug.contains("super-secret"));
    }

    #[test]
    fn test_clones_share_state() {
        let session = SessionStore::ephemeral();
        let clone = session.clone();
        session.set_token("shared");
        assert!(clone.is_authenticated());
    }
}
