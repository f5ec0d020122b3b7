//! HTTP transport adapter for the Ratehub REST API.
//!
//! [`ApiClient`] is pure transport: one typed async method per remote
//! operation, JSON in and out, bearer token attached from the shared
//! [`SessionStore`] when one is held. No caching and no retries happen
//! here; that is the query layer's job.

mod types;

pub use types::*;

use std::sync::Arc;

use reqwest::header::AUTHORIZATION;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::instrument;

use ratehub_core::{
    AdminDashboard, OwnerDashboard, OwnerRatingFilter, Paginated, Rating, Store, StoreFilter,
    StoreSearch, User, UserFilter,
};

use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::session::SessionStore;

/// Typed client for the Ratehub API.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base: String,
    session: SessionStore,
}

impl ApiClient {
    /// Build a client against the configured base URL, reading bearer
    /// tokens from `session` on every request.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Internal`] if the underlying HTTP client fails
    /// to build.
    pub fn new(config: &ClientConfig, session: SessionStore) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| ApiError::Internal(format!("failed to build HTTP client: {e}")))?;
        let base = config.api_url.as_str().trim_end_matches('/').to_string();

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                client,
                base,
                session,
            }),
        })
    }

    // Auth ------------------------------------------------------------

    /// # Errors
    ///
    /// Returns the server's message on rejected credentials.
    #[instrument(skip_all)]
    pub async fn login(&self, input: &LoginRequest) -> Result<AuthResponse, ApiError> {
        self.post("/api/auth/login", input).await
    }

    /// # Errors
    ///
    /// Returns the server's message when registration is rejected, e.g. a
    /// duplicate email.
    #[instrument(skip_all)]
    pub async fn register(&self, input: &RegisterInput) -> Result<AuthResponse, ApiError> {
        self.post("/api/auth/register", input).await
    }

    /// # Errors
    ///
    /// Returns an API error when the session token is missing or expired.
    #[instrument(skip(self))]
    pub async fn current_user(&self) -> Result<User, ApiError> {
        let response: CurrentUserResponse = self.get("/api/auth/me").await?;
        Ok(response.user)
    }

    /// # Errors
    ///
    /// Returns the server's message when the current password is wrong.
    #[instrument(skip_all)]
    pub async fn change_password(&self, input: &ChangePasswordRequest) -> Result<(), ApiError> {
        self.post_no_content("/api/auth/password", input).await
    }

    /// # Errors
    ///
    /// Returns an API error if the update is rejected.
    #[instrument(skip(self, input))]
    pub async fn update_profile(&self, input: &UpdateProfileInput) -> Result<User, ApiError> {
        self.patch("/api/auth/profile", input).await
    }

    // Admin -----------------------------------------------------------

    /// # Errors
    ///
    /// Returns an API error for non-admin callers.
    #[instrument(skip(self))]
    pub async fn admin_users(&self, filter: &UserFilter) -> Result<Paginated<User>, ApiError> {
        self.get_with_query("/api/admin/users", &filter.to_query())
            .await
    }

    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] for an unknown id.
    #[instrument(skip(self))]
    pub async fn admin_user(&self, id: i64) -> Result<User, ApiError> {
        self.get(&format!("/api/admin/users/{id}")).await
    }

    /// # Errors
    ///
    /// Returns the server's validation message on a rejected payload.
    #[instrument(skip_all)]
    pub async fn create_admin_user(&self, input: &CreateUserInput) -> Result<User, ApiError> {
        self.post("/api/admin/users", input).await
    }

    /// # Errors
    ///
    /// Returns an API error if the update is rejected.
    #[instrument(skip(self, input))]
    pub async fn update_admin_user(
        &self,
        id: i64,
        input: &UpdateUserInput,
    ) -> Result<User, ApiError> {
        self.patch(&format!("/api/admin/users/{id}"), input).await
    }

    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] for an unknown id.
    #[instrument(skip(self))]
    pub async fn delete_admin_user(&self, id: i64) -> Result<(), ApiError> {
        self.delete(&format!("/api/admin/users/{id}")).await
    }

    /// # Errors
    ///
    /// Returns an API error for non-admin callers.
    #[instrument(skip(self))]
    pub async fn admin_stores(&self, filter: &StoreFilter) -> Result<Paginated<Store>, ApiError> {
        self.get_with_query("/api/admin/stores", &filter.to_query())
            .await
    }

    /// # Errors
    ///
    /// Returns the server's validation message on a rejected payload.
    #[instrument(skip_all)]
    pub async fn create_admin_store(&self, input: &CreateStoreInput) -> Result<Store, ApiError> {
        self.post("/api/admin/stores", input).await
    }

    /// # Errors
    ///
    /// Returns an API error if the update is rejected.
    #[instrument(skip(self, input))]
    pub async fn update_admin_store(
        &self,
        id: i64,
        input: &UpdateStoreInput,
    ) -> Result<Store, ApiError> {
        self.patch(&format!("/api/admin/stores/{id}"), input).await
    }

    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] for an unknown id.
    #[instrument(skip(self))]
    pub async fn delete_admin_store(&self, id: i64) -> Result<(), ApiError> {
        self.delete(&format!("/api/admin/stores/{id}")).await
    }

    /// # Errors
    ///
    /// Returns an API error for non-admin callers.
    #[instrument(skip(self))]
    pub async fn admin_dashboard(&self) -> Result<AdminDashboard, ApiError> {
        self.get("/api/admin/dashboard").await
    }

    // Public stores ---------------------------------------------------

    /// # Errors
    ///
    /// Returns an API error if the request fails.
    #[instrument(skip(self))]
    pub async fn public_stores(&self, search: &StoreSearch) -> Result<Paginated<Store>, ApiError> {
        self.get_with_query("/api/public/stores", &search.to_query())
            .await
    }

    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] for an unknown id.
    #[instrument(skip(self))]
    pub async fn public_store(&self, id: i64) -> Result<Store, ApiError> {
        self.get(&format!("/api/public/stores/{id}")).await
    }

    // Ratings ---------------------------------------------------------

    /// The caller's own rating of a store.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] when the caller has not rated the
    /// store; the query layer turns that into a `None`.
    #[instrument(skip(self))]
    pub async fn user_store_rating(&self, store_id: i64) -> Result<Rating, ApiError> {
        self.get(&format!("/api/public/store-rating/{store_id}"))
            .await
    }

    /// # Errors
    ///
    /// Returns the server's validation message on a rejected payload.
    #[instrument(skip(self, input))]
    pub async fn create_rating(
        &self,
        store_id: i64,
        input: &RatingInput,
    ) -> Result<Rating, ApiError> {
        self.post(&format!("/api/user/stores/{store_id}/ratings"), input)
            .await
    }

    /// # Errors
    ///
    /// Returns an API error if the update is rejected.
    #[instrument(skip(self, input))]
    pub async fn update_rating(
        &self,
        rating_id: i64,
        input: &RatingInput,
    ) -> Result<Rating, ApiError> {
        self.patch(&format!("/api/user/ratings/{rating_id}"), input)
            .await
    }

    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] for an unknown id.
    #[instrument(skip(self))]
    pub async fn delete_rating(&self, rating_id: i64) -> Result<(), ApiError> {
        self.delete(&format!("/api/user/ratings/{rating_id}")).await
    }

    // Owner -----------------------------------------------------------

    /// # Errors
    ///
    /// Returns an API error for callers who own no store.
    #[instrument(skip(self))]
    pub async fn owner_dashboard(&self) -> Result<OwnerDashboard, ApiError> {
        self.get("/api/owner/dashboard").await
    }

    /// # Errors
    ///
    /// Returns an API error for callers who own no store.
    #[instrument(skip(self))]
    pub async fn owner_ratings(
        &self,
        filter: &OwnerRatingFilter,
    ) -> Result<Paginated<Rating>, ApiError> {
        self.get_with_query("/api/owner/ratings", &filter.to_query())
            .await
    }

    // Request plumbing ------------------------------------------------

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.inner.base)
    }

    fn authorize(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.inner.session.bearer() {
            Some(bearer) => builder.header(AUTHORIZATION, bearer),
            None => builder,
        }
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self
            .authorize(self.inner.client.get(self.url(path)))
            .send()
            .await?;
        Self::handle_response(response).await
    }

    async fn get_with_query<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let response = self
            .authorize(self.inner.client.get(self.url(path)).query(query))
            .send()
            .await?;
        Self::handle_response(response).await
    }

    async fn post<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let response = self
            .authorize(self.inner.client.post(self.url(path)).json(body))
            .send()
            .await?;
        Self::handle_response(response).await
    }

    async fn post_no_content<B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<(), ApiError> {
        let response = self
            .authorize(self.inner.client.post(self.url(path)).json(body))
            .send()
            .await?;
        if response.status().is_success() {
            return Ok(());
        }
        Err(Self::error_from(response).await)
    }

    async fn patch<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let response = self
            .authorize(self.inner.client.patch(self.url(path)).json(body))
            .send()
            .await?;
        Self::handle_response(response).await
    }

    async fn delete(&self, path: &str) -> Result<(), ApiError> {
        let response = self
            .authorize(self.inner.client.delete(self.url(path)))
            .send()
            .await?;
        if response.status().is_success() {
            return Ok(());
        }
        Err(Self::error_from(response).await)
    }

    async fn handle_response<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ApiError> {
        if response.status().is_success() {
            return response
                .json()
                .await
                .map_err(|e| ApiError::Parse(e.to_string()));
        }
        Err(Self::error_from(response).await)
    }

    /// Non-2xx responses carry `{"message": …}`; fall back to the raw body
    /// when they do not.
    async fn error_from(response: reqwest::Response) -> ApiError {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&body).map_or_else(
            |_| {
                if body.trim().is_empty() {
                    format!("request failed with status {status}")
                } else {
                    body
                }
            },
            |parsed| parsed.message,
        );

        if status == 404 {
            ApiError::NotFound(message)
        } else {
            ApiError::Api { status, message }
        }
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base", &self.inner.base)
            .finish_non_exhaustive()
    }
}
