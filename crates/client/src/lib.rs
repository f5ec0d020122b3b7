//! Ratehub API client: session management, a typed HTTP adapter, and a
//! stale-while-revalidate query cache over the store-rating platform's
//! REST API.
//!
//! [`RatehubClient`] wires the pieces together and is the only type most
//! consumers need. It is cheap to clone; clones share the session, the
//! cache, and the connection pool.
//!
//! ```no_run
//! use ratehub_client::{ClientConfig, RatehubClient};
//!
//! # async fn run() -> Result<(), ratehub_client::ApiError> {
//! let client = RatehubClient::from_env()?;
//! let stores = client.stores().list(&Default::default()).await?;
//! for store in &stores.items {
//!     println!("{} ({:.1})", store.name, store.average_rating);
//! }
//! # Ok(())
//! # }
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cache;
pub mod config;
pub mod debounce;
pub mod error;
pub mod forms;
pub mod http;
pub mod queries;
pub mod session;

pub use cache::{CacheEvent, MutationPlan, QueryCache, QueryKey, QueryOptions, RetryPolicy};
pub use config::{ClientConfig, ConfigError};
pub use debounce::Debouncer;
pub use error::ApiError;
pub use session::SessionStore;

use std::sync::Arc;

use tracing::info;

use crate::http::ApiClient;
use crate::queries::{Admin, Auth, Owner, Ratings, Stores};

/// Handle to the Ratehub platform.
#[derive(Clone)]
pub struct RatehubClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    config: ClientConfig,
    session: SessionStore,
    api: ApiClient,
    cache: QueryCache,
}

impl RatehubClient {
    /// Build a client, restoring any persisted session.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Internal`] if the HTTP client fails to build.
    pub fn new(config: ClientConfig) -> Result<Self, ApiError> {
        let session = SessionStore::load(config.session_file.clone());
        let api = ApiClient::new(&config, session.clone())?;

        Ok(Self {
            inner: Arc::new(ClientInner {
                config,
                session,
                api,
                cache: QueryCache::new(),
            }),
        })
    }

    /// Build a client from `RATEHUB_*` environment variables.
    ///
    /// # Errors
    ///
    /// Configuration errors are folded into [`ApiError::Internal`].
    pub fn from_env() -> Result<Self, ApiError> {
        let config = ClientConfig::from_env().map_err(|e| ApiError::Internal(e.to_string()))?;
        Self::new(config)
    }

    /// Drop the session and everything cached under it. After this call no
    /// data from the previous user can be served, stale or otherwise.
    pub async fn logout(&self) {
        self.inner.session.clear_token();
        self.inner.cache.clear().await;
        info!("logged out");
    }

    /// Authentication and profile operations.
    #[must_use]
    pub const fn auth(&self) -> Auth<'_> {
        Auth::new(self)
    }

    /// Admin-only user/store management.
    #[must_use]
    pub const fn admin(&self) -> Admin<'_> {
        Admin::new(self)
    }

    /// Public store browsing.
    #[must_use]
    pub const fn stores(&self) -> Stores<'_> {
        Stores::new(self)
    }

    /// The caller's own ratings.
    #[must_use]
    pub const fn ratings(&self) -> Ratings<'_> {
        Ratings::new(self)
    }

    /// Store-owner dashboard and rating feed.
    #[must_use]
    pub const fn owner(&self) -> Owner<'_> {
        Owner::new(self)
    }

    #[must_use]
    pub fn session(&self) -> &SessionStore {
        &self.inner.session
    }

    #[must_use]
    pub fn cache(&self) -> &QueryCache {
        &self.inner.cache
    }

    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    pub(crate) fn api(&self) -> &ApiClient {
        &self.inner.api
    }
}

impl std::fmt::Debug for RatehubClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RatehubClient")
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}
