//! Public store browsing.
//!
//! The listing key carries the full search parameters, so every
//! page/sort/search combination is its own cache entry and invalidating
//! the `["public", "stores"]` prefix hits all of them at once.

use std::sync::Arc;

use ratehub_core::{Paginated, Store, StoreSearch};

use crate::RatehubClient;
use crate::cache::{QueryKey, QueryOptions};
use crate::error::ApiError;
use crate::queries::require;

pub(crate) fn list_key(search: &StoreSearch) -> QueryKey {
    QueryKey::new(["public", "stores"]).with_params(search)
}

pub(crate) fn detail_key(id: i64) -> QueryKey {
    QueryKey::new(["public", "store"]).push(id.to_string())
}

/// Store browsing, available with or without a session. With one, entries
/// include the caller's own rating.
pub struct Stores<'a> {
    client: &'a RatehubClient,
}

impl<'a> Stores<'a> {
    pub(crate) const fn new(client: &'a RatehubClient) -> Self {
        Self { client }
    }

    /// Search the store listing. Search-driven reads always revalidate;
    /// freshness is handled by debouncing the input instead.
    ///
    /// # Errors
    ///
    /// Returns an API error if the request fails.
    pub async fn list(&self, search: &StoreSearch) -> Result<Arc<Paginated<Store>>, ApiError> {
        let api = self.client.api().clone();
        let search = search.clone();
        let data = self
            .client
            .cache()
            .fetch(list_key(&search), QueryOptions::default(), move || {
                let api = api.clone();
                let search = search.clone();
                async move { api.public_stores(&search).await }
            })
            .await?;
        require(data)
    }

    /// # Errors
    ///
    /// [`ApiError::NotFound`] for an unknown id.
    pub async fn detail(&self, id: i64) -> Result<Arc<Store>, ApiError> {
        let api = self.client.api().clone();
        let options = QueryOptions::default().stale_time(self.client.config().stale_time);
        let data = self
            .client
            .cache()
            .fetch(detail_key(id), options, move || {
                let api = api.clone();
                async move { api.public_store(id).await }
            })
            .await?;
        require(data)
    }
}
