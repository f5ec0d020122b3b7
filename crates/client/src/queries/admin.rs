//! Administrator queries: user and store management, dashboard counters.
//!
//! Every mutation here invalidates the listings it can change. Store
//! mutations additionally invalidate the public store listings, since the
//! public view is a projection of the same data.

use std::sync::Arc;

use ratehub_core::{AdminDashboard, Paginated, Store, StoreFilter, User, UserFilter};

use crate::RatehubClient;
use crate::cache::{MutationPlan, QueryKey, QueryOptions};
use crate::error::ApiError;
use crate::http::{CreateStoreInput, CreateUserInput, UpdateStoreInput, UpdateUserInput};
use crate::queries::require_auth;

fn users_key(filter: &UserFilter) -> QueryKey {
    QueryKey::new(["admin", "users"]).with_params(filter)
}

fn user_key(id: i64) -> QueryKey {
    QueryKey::new(["admin", "user"]).push(id.to_string())
}

fn stores_key(filter: &StoreFilter) -> QueryKey {
    QueryKey::new(["admin", "stores"]).with_params(filter)
}

fn dashboard_key() -> QueryKey {
    QueryKey::new(["admin", "dashboard"])
}

/// Admin-only operations. The server enforces the role; these queries are
/// merely disabled without a session.
pub struct Admin<'a> {
    client: &'a RatehubClient,
}

impl<'a> Admin<'a> {
    pub(crate) const fn new(client: &'a RatehubClient) -> Self {
        Self { client }
    }

    fn list_options(&self) -> QueryOptions {
        QueryOptions::default()
            .enabled(self.client.session().is_authenticated())
            .stale_time(self.client.config().stale_time)
    }

    /// # Errors
    ///
    /// [`ApiError::NotAuthenticated`] without a session; otherwise the
    /// server's error.
    pub async fn users(&self, filter: &UserFilter) -> Result<Arc<Paginated<User>>, ApiError> {
        let api = self.client.api().clone();
        let filter = filter.clone();
        let data = self
            .client
            .cache()
            .fetch(users_key(&filter), self.list_options(), move || {
                let api = api.clone();
                let filter = filter.clone();
                async move { api.admin_users(&filter).await }
            })
            .await?;
        require_auth(data)
    }

    /// # Errors
    ///
    /// [`ApiError::NotFound`] for an unknown id.
    pub async fn user(&self, id: i64) -> Result<Arc<User>, ApiError> {
        let api = self.client.api().clone();
        let data = self
            .client
            .cache()
            .fetch(user_key(id), self.list_options(), move || {
                let api = api.clone();
                async move { api.admin_user(id).await }
            })
            .await?;
        require_auth(data)
    }

    /// # Errors
    ///
    /// The server's validation message on a rejected payload.
    pub async fn create_user(&self, input: CreateUserInput) -> Result<User, ApiError> {
        let api = self.client.api().clone();
        self.client
            .cache()
            .mutate(
                MutationPlan::new()
                    .invalidate(QueryKey::new(["admin", "users"]))
                    .invalidate(dashboard_key()),
                async move { api.create_admin_user(&input).await },
            )
            .await
    }

    /// # Errors
    ///
    /// The server's error on a rejected update.
    pub async fn update_user(&self, id: i64, input: UpdateUserInput) -> Result<User, ApiError> {
        let api = self.client.api().clone();
        self.client
            .cache()
            .mutate(
                MutationPlan::new()
                    .invalidate(QueryKey::new(["admin", "users"]))
                    .invalidate(user_key(id)),
                async move { api.update_admin_user(id, &input).await },
            )
            .await
    }

    /// # Errors
    ///
    /// [`ApiError::NotFound`] for an unknown id.
    pub async fn delete_user(&self, id: i64) -> Result<(), ApiError> {
        let api = self.client.api().clone();
        self.client
            .cache()
            .mutate(
                MutationPlan::new()
                    .invalidate(QueryKey::new(["admin", "users"]))
                    .invalidate(dashboard_key())
                    .remove(user_key(id)),
                async move { api.delete_admin_user(id).await },
            )
            .await
    }

    /// # Errors
    ///
    /// [`ApiError::NotAuthenticated`] without a session; otherwise the
    /// server's error.
    pub async fn stores(&self, filter: &StoreFilter) -> Result<Arc<Paginated<Store>>, ApiError> {
        let api = self.client.api().clone();
        let filter = filter.clone();
        let data = self
            .client
            .cache()
            .fetch(stores_key(&filter), self.list_options(), move || {
                let api = api.clone();
                let filter = filter.clone();
                async move { api.admin_stores(&filter).await }
            })
            .await?;
        require_auth(data)
    }

    /// # Errors
    ///
    /// The server's validation message on a rejected payload.
    pub async fn create_store(&self, input: CreateStoreInput) -> Result<Store, ApiError> {
        let api = self.client.api().clone();
        self.client
            .cache()
            .mutate(
                MutationPlan::new()
                    .invalidate(QueryKey::new(["admin", "stores"]))
                    .invalidate(QueryKey::new(["public", "stores"]))
                    .invalidate(dashboard_key()),
                async move { api.create_admin_store(&input).await },
            )
            .await
    }

    /// # Errors
    ///
    /// The server's error on a rejected update.
    pub async fn update_store(&self, id: i64, input: UpdateStoreInput) -> Result<Store, ApiError> {
        let api = self.client.api().clone();
        self.client
            .cache()
            .mutate(
                MutationPlan::new()
                    .invalidate(QueryKey::new(["admin", "stores"]))
                    .invalidate(QueryKey::new(["public", "stores"]))
                    .invalidate(QueryKey::new(["public", "store"]).push(id.to_string())),
                async move { api.update_admin_store(id, &input).await },
            )
            .await
    }

    /// # Errors
    ///
    /// [`ApiError::NotFound`] for an unknown id.
    pub async fn delete_store(&self, id: i64) -> Result<(), ApiError> {
        let api = self.client.api().clone();
        self.client
            .cache()
            .mutate(
                MutationPlan::new()
                    .invalidate(QueryKey::new(["admin", "stores"]))
                    .invalidate(QueryKey::new(["public", "stores"]))
                    .invalidate(dashboard_key())
                    .remove(QueryKey::new(["public", "store"]).push(id.to_string())),
                async move { api.delete_admin_store(id).await },
            )
            .await
    }

    /// Platform-wide counters.
    ///
    /// # Errors
    ///
    /// [`ApiError::NotAuthenticated`] without a session; otherwise the
    /// server's error.
    pub async fn dashboard(&self) -> Result<Arc<AdminDashboard>, ApiError> {
        let api = self.client.api().clone();
        let data = self
            .client
            .cache()
            .fetch(dashboard_key(), self.list_options(), move || {
                let api = api.clone();
                async move { api.admin_dashboard().await }
            })
            .await?;
        require_auth(data)
    }
}
