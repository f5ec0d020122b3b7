//! Session and profile queries.

use std::sync::Arc;
use std::time::Duration;

use ratehub_core::User;

use crate::RatehubClient;
use crate::cache::{MutationPlan, QueryKey, QueryOptions};
use crate::error::ApiError;
use crate::http::{ChangePasswordRequest, LoginRequest, RegisterInput, UpdateProfileInput};

/// The current user changes only through this module's own mutations, so
/// it can stay fresh for a long time.
const ME_STALE: Duration = Duration::from_secs(24 * 60 * 60);

fn me_key() -> QueryKey {
    QueryKey::new(["auth", "me"])
}

/// Authentication and profile operations.
pub struct Auth<'a> {
    client: &'a RatehubClient,
}

impl<'a> Auth<'a> {
    pub(crate) const fn new(client: &'a RatehubClient) -> Self {
        Self { client }
    }

    /// The logged-in user, or `None` when no session is held. Cached
    /// heavily; login, logout, and profile updates reset it.
    ///
    /// # Errors
    ///
    /// Returns an API error when the held token is rejected. Auth lookups
    /// are never retried.
    pub async fn current_user(&self) -> Result<Option<Arc<User>>, ApiError> {
        let api = self.client.api().clone();
        let options = QueryOptions::default()
            .enabled(self.client.session().is_authenticated())
            .stale_time(ME_STALE)
            .no_retry();

        self.client
            .cache()
            .fetch(me_key(), options, move || {
                let api = api.clone();
                async move { api.current_user().await }
            })
            .await
    }

    /// Exchange credentials for a session. Replaces any existing session;
    /// the cache is cleared first so nothing from the previous user
    /// survives.
    ///
    /// # Errors
    ///
    /// Returns the server's message on rejected credentials. The existing
    /// session is left untouched on failure.
    pub async fn login(&self, email: &str, password: &str) -> Result<User, ApiError> {
        let response = self
            .client
            .api()
            .login(&LoginRequest {
                email: email.to_string(),
                password: password.to_string(),
            })
            .await?;

        self.client.cache().clear().await;
        self.client.session().set_token(&response.token);
        Ok(response.user)
    }

    /// Create an account and log straight into it.
    ///
    /// # Errors
    ///
    /// Returns the server's message when registration is rejected.
    pub async fn register(&self, input: RegisterInput) -> Result<User, ApiError> {
        let response = self.client.api().register(&input).await?;

        self.client.cache().clear().await;
        self.client.session().set_token(&response.token);
        Ok(response.user)
    }

    /// # Errors
    ///
    /// Returns the server's message when the current password is wrong.
    pub async fn change_password(&self, current: &str, new: &str) -> Result<(), ApiError> {
        self.client
            .api()
            .change_password(&ChangePasswordRequest {
                current_password: current.to_string(),
                new_password: new.to_string(),
            })
            .await
    }

    /// Update the caller's own profile. The cached current user is
    /// invalidated so the next read shows the new values.
    ///
    /// # Errors
    ///
    /// Returns an API error if the update is rejected.
    pub async fn update_profile(&self, input: UpdateProfileInput) -> Result<User, ApiError> {
        let api = self.client.api().clone();
        self.client
            .cache()
            .mutate(MutationPlan::new().invalidate(me_key()), async move {
                api.update_profile(&input).await
            })
            .await
    }
}
