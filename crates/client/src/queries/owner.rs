//! Store-owner queries: the owner's dashboard and the ratings their store
//! has received.

use std::sync::Arc;

use ratehub_core::{OwnerDashboard, OwnerRatingFilter, Paginated, Rating};

use crate::RatehubClient;
use crate::cache::{QueryKey, QueryOptions};
use crate::error::ApiError;
use crate::queries::require_auth;

fn dashboard_key() -> QueryKey {
    QueryKey::new(["owner", "dashboard"])
}

fn ratings_key(filter: &OwnerRatingFilter) -> QueryKey {
    QueryKey::new(["owner", "ratings"]).with_params(filter)
}

pub struct Owner<'a> {
    client: &'a RatehubClient,
}

impl<'a> Owner<'a> {
    pub(crate) const fn new(client: &'a RatehubClient) -> Self {
        Self { client }
    }

    fn options(&self) -> QueryOptions {
        QueryOptions::default()
            .enabled(self.client.session().is_authenticated())
            .stale_time(self.client.config().stale_time)
    }

    /// Aggregates for the caller's store.
    ///
    /// # Errors
    ///
    /// [`ApiError::NotAuthenticated`] without a session; otherwise the
    /// server's error, e.g. for callers who own no store.
    pub async fn dashboard(&self) -> Result<Arc<OwnerDashboard>, ApiError> {
        let api = self.client.api().clone();
        let data = self
            .client
            .cache()
            .fetch(dashboard_key(), self.options(), move || {
                let api = api.clone();
                async move { api.owner_dashboard().await }
            })
            .await?;
        require_auth(data)
    }

    /// Ratings received by the caller's store.
    ///
    /// # Errors
    ///
    /// [`ApiError::NotAuthenticated`] without a session; otherwise the
    /// server's error.
    pub async fn ratings(
        &self,
        filter: &OwnerRatingFilter,
    ) -> Result<Arc<Paginated<Rating>>, ApiError> {
        let api = self.client.api().clone();
        let filter = filter.clone();
        let data = self
            .client
            .cache()
            .fetch(ratings_key(&filter), self.options(), move || {
                let api = api.clone();
                let filter = filter.clone();
                async move { api.owner_ratings(&filter).await }
            })
            .await?;
        require_auth(data)
    }
}
