//! Self-service profile edit dialog. Edit-only; the draft is seeded from
//! the cached current user and submits changed fields through
//! [`Auth::update_profile`](crate::queries::Auth::update_profile), which
//! invalidates the cached current user.

use std::sync::Arc;

use ratehub_core::{Email, User, UserName};

use crate::RatehubClient;
use crate::error::ApiError;
use crate::forms::{FormError, changed};
use crate::http::UpdateProfileInput;

#[derive(Debug)]
pub struct ProfileForm {
    original: Arc<User>,
    pub name: String,
    pub email: String,
    pub address: String,
    submitting: bool,
    open: bool,
}

impl ProfileForm {
    /// Open the dialog seeded from the logged-in user.
    ///
    /// # Errors
    ///
    /// [`ApiError::NotAuthenticated`] when no session is held.
    pub async fn open(client: &RatehubClient) -> Result<Self, ApiError> {
        let original = client
            .auth()
            .current_user()
            .await?
            .ok_or(ApiError::NotAuthenticated)?;

        Ok(Self {
            name: original.name.clone(),
            email: original.email.clone(),
            address: original.address.clone().unwrap_or_default(),
            original,
            submitting: false,
            open: true,
        })
    }

    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.open
    }

    /// Close without submitting. Refused while a submission is in flight.
    pub const fn close(&mut self) -> Result<(), FormError> {
        if self.submitting {
            return Err(FormError::SubmissionInFlight);
        }
        self.open = false;
        Ok(())
    }

    /// Submit changed fields only; an unchanged draft skips the network
    /// and returns the user as-is.
    ///
    /// # Errors
    ///
    /// [`FormError::Validation`] before any network call;
    /// [`FormError::Api`] on rejection, leaving the dialog open.
    pub async fn submit(&mut self, client: &RatehubClient) -> Result<User, FormError> {
        if self.submitting {
            return Err(FormError::SubmissionInFlight);
        }

        let name = changed(&self.name, &self.original.name);
        if let Some(name) = &name {
            UserName::parse(name).map_err(FormError::validation)?;
        }
        let email = changed(&self.email, &self.original.email);
        if let Some(email) = &email {
            Email::parse(email).map_err(FormError::validation)?;
        }
        let address = changed(&self.address, self.original.address.as_deref().unwrap_or(""));

        let input = UpdateProfileInput {
            name,
            email,
            address,
        };
        if input.is_empty() {
            self.open = false;
            return Ok((*self.original).clone());
        }

        self.submitting = true;
        let result = client.auth().update_profile(input).await;
        self.submitting = false;

        let user = result?;
        self.open = false;
        Ok(user)
    }
}
