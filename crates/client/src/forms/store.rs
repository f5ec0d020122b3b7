//! Admin store create/edit dialog.

use std::sync::Arc;

use ratehub_core::{Email, Store, UserName};

use crate::RatehubClient;
use crate::error::ApiError;
use crate::forms::{FormError, changed, non_blank};
use crate::http::{CreateStoreInput, UpdateStoreInput};

#[derive(Debug, Clone, PartialEq)]
pub enum StoreFormOutcome {
    Created(Store),
    Updated(Store),
    /// Edit mode with nothing changed; no request was sent.
    Unchanged,
}

#[derive(Debug)]
enum Mode {
    Create,
    Edit { id: i64, original: Arc<Store> },
}

#[derive(Debug)]
pub struct StoreForm {
    mode: Mode,
    pub name: String,
    pub email: String,
    pub address: String,
    pub owner_id: Option<i64>,
    submitting: bool,
    open: bool,
}

impl StoreForm {
    #[must_use]
    pub fn create() -> Self {
        Self {
            mode: Mode::Create,
            name: String::new(),
            email: String::new(),
            address: String::new(),
            owner_id: None,
            submitting: false,
            open: true,
        }
    }

    /// Open an edit dialog pre-filled from the server's current record.
    ///
    /// # Errors
    ///
    /// The lookup's error, e.g. [`ApiError::NotFound`].
    pub async fn edit(client: &RatehubClient, id: i64) -> Result<Self, ApiError> {
        let original = client.stores().detail(id).await?;
        Ok(Self {
            mode: Mode::Edit {
                id,
                original: Arc::clone(&original),
            },
            name: original.name.clone(),
            email: original.email.clone().unwrap_or_default(),
            address: original.address.clone(),
            owner_id: original.owner_id,
            submitting: false,
            open: true,
        })
    }

    #[must_use]
    pub const fn is_edit(&self) -> bool {
        matches!(self.mode, Mode::Edit { .. })
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

    /// Validate and submit. Store names follow the same 20-60 character
    /// rule as user names; the address is required.
    ///
    /// # Errors
    ///
    /// [`FormError::Validation`] before any network call;
    /// [`FormError::Api`] with the server's message on rejection, leaving
    /// the dialog open.
    pub async fn submit(&mut self, client: &RatehubClient) -> Result<StoreFormOutcome, FormError> {
        if self.submitting {
            return Err(FormError::SubmissionInFlight);
        }

        let outcome = match &self.mode {
            Mode::Create => {
                let name = UserName::parse(&self.name).map_err(FormError::validation)?;
                let email = non_blank(&self.email);
                if let Some(email) = &email {
                    Email::parse(email).map_err(FormError::validation)?;
                }
                let address = non_blank(&self.address)
                    .ok_or_else(|| FormError::Validation("address is required".to_string()))?;

                let input = CreateStoreInput {
                    name: name.as_str().to_string(),
                    email,
                    address,
                    owner_id: self.owner_id,
                };

                self.submitting = true;
                let result = client.admin().create_store(input).await;
                self.submitting = false;
                StoreFormOutcome::Created(result?)
            }
            Mode::Edit { id, original } => {
                let name = changed(&self.name, &original.name);
                if let Some(name) = &name {
                    UserName::parse(name).map_err(FormError::validation)?;
                }
                let email = changed(&self.email, original.email.as_deref().unwrap_or(""));
                if let Some(email) = &email {
                    Email::parse(email).map_err(FormError::validation)?;
                }
                let address = changed(&self.address, &original.address);
                let owner_id = (self.owner_id != original.owner_id)
                    .then_some(self.owner_id)
                    .flatten();

                let input = UpdateStoreInput {
                    name,
                    email,
                    address,
                    owner_id,
                };
                if input.is_empty() {
                    self.open = false;
                    return Ok(StoreFormOutcome::Unchanged);
                }

                let id = *id;
                self.submitting = true;
                let result = client.admin().update_store(id, input).await;
                self.submitting = false;
                StoreFormOutcome::Updated(result?)
            }
        };

        self.open = false;
        Ok(outcome)
    }
}
