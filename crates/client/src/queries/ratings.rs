//! The caller's own store ratings.
//!
//! Rating mutations ripple into the public store data (averages, counts),
//! so every plan here invalidates the listings and the store's detail
//! alongside the rating lookup itself. Deleting goes further: the lookup
//! entry is removed, not just staled, so a read after deletion reports "no
//! rating" instead of serving the dead one.

use std::sync::Arc;

use ratehub_core::{Rating, RatingValue};

use crate::RatehubClient;
use crate::cache::{MutationPlan, QueryKey, QueryOptions};
use crate::error::ApiError;
use crate::http::RatingInput;
use crate::queries::stores;

pub(crate) fn lookup_key(store_id: i64) -> QueryKey {
    QueryKey::new(["user", "store-rating"]).push(store_id.to_string())
}

fn rating_plan(store_id: i64) -> MutationPlan {
    MutationPlan::new()
        .invalidate(QueryKey::new(["public", "stores"]))
        .invalidate(stores::detail_key(store_id))
        .invalidate(lookup_key(store_id))
}

/// Rating operations for the logged-in user.
pub struct Ratings<'a> {
    client: &'a RatehubClient,
}

impl<'a> Ratings<'a> {
    pub(crate) const fn new(client: &'a RatehubClient) -> Self {
        Self { client }
    }

    /// The caller's rating of a store, `None` when they have not rated it.
    /// Absence is cached like any other answer.
    ///
    /// # Errors
    ///
    /// Any failure other than not-found. Lookups are never retried.
    pub async fn for_store(&self, store_id: i64) -> Result<Option<Arc<Rating>>, ApiError> {
        let api = self.client.api().clone();
        let options = QueryOptions::default()
            .enabled(self.client.session().is_authenticated())
            .stale_time(self.client.config().stale_time)
            .no_retry();

        self.client
            .cache()
            .fetch_optional(lookup_key(store_id), options, move || {
                let api = api.clone();
                async move { api.user_store_rating(store_id).await }
            })
            .await
    }

    /// # Errors
    ///
    /// The server's validation message on a rejected payload.
    pub async fn create(
        &self,
        store_id: i64,
        value: RatingValue,
        comment: Option<String>,
    ) -> Result<Rating, ApiError> {
        let api = self.client.api().clone();
        let input = RatingInput {
            rating: value.get(),
            comment,
        };
        self.client
            .cache()
            .mutate(rating_plan(store_id), async move {
                api.create_rating(store_id, &input).await
            })
            .await
    }

    /// # Errors
    ///
    /// The server's error on a rejected update.
    pub async fn update(
        &self,
        rating_id: i64,
        store_id: i64,
        value: RatingValue,
        comment: Option<String>,
    ) -> Result<Rating, ApiError> {
        let api = self.client.api().clone();
        let input = RatingInput {
            rating: value.get(),
            comment,
        };
        self.client
            .cache()
            .mutate(rating_plan(store_id), async move {
                api.update_rating(rating_id, &input).await
            })
            .await
    }

    /// # Errors
    ///
    /// [`ApiError::NotFound`] for an unknown rating id.
    pub async fn delete(&self, rating_id: i64, store_id: i64) -> Result<(), ApiError> {
        let api = self.client.api().clone();
        self.client
            .cache()
            .mutate(
                MutationPlan::new()
                    .invalidate(QueryKey::new(["public", "stores"]))
                    .invalidate(stores::detail_key(store_id))
                    .remove(lookup_key(store_id)),
                async move { api.delete_rating(rating_id).await },
            )
            .await
    }
}
