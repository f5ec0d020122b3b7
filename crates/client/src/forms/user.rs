//! Admin user create/edit dialog.

use std::sync::Arc;

use ratehub_core::{Email, Password, Role, User, UserName};

use crate::RatehubClient;
use crate::error::ApiError;
use crate::forms::{FormError, changed, non_blank};
use crate::http::{CreateUserInput, UpdateUserInput};

/// What submitting the form did.
#[derive(Debug, Clone, PartialEq)]
pub enum UserFormOutcome {
    Created(User),
    Updated(User),
    /// Edit mode with nothing changed; no request was sent.
    Unchanged,
}

#[derive(Debug)]
enum Mode {
    Create,
    Edit { id: i64, original: Arc<User> },
}

#[derive(Debug)]
pub struct UserForm {
    mode: Mode,
    pub name: String,
    pub email: String,
    pub address: String,
    pub password: String,
    pub role: Role,
    submitting: bool,
    open: bool,
}

impl UserForm {
    /// Open a blank create dialog.
    #[must_use]
    pub fn create() -> Self {
        Self {
            mode: Mode::Create,
            name: String::new(),
            email: String::new(),
            address: String::new(),
            password: String::new(),
            role: Role::User,
            submitting: false,
            open: true,
        }
    }

    /// Open an edit dialog pre-filled from the server's current record.
    /// Each open re-syncs, so a previously cancelled edit leaves no trace.
    ///
    /// # Errors
    ///
    /// The lookup's error, e.g. [`ApiError::NotFound`].
    pub async fn edit(client: &RatehubClient, id: i64) -> Result<Self, ApiError> {
        let original = client.admin().user(id).await?;
        Ok(Self {
            mode: Mode::Edit {
                id,
                original: Arc::clone(&original),
            },
            name: original.name.clone(),
            email: original.email.clone(),
            address: original.address.clone().unwrap_or_default(),
            password: String::new(),
            role: original.role,
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

    /// Validate and submit. Create mode sends the whole draft; edit mode
    /// sends only changed fields and skips the network when nothing
    /// changed.
    ///
    /// # Errors
    ///
    /// [`FormError::Validation`] before any network call;
    /// [`FormError::Api`] with the server's message on rejection, leaving
    /// the dialog open.
    pub async fn submit(&mut self, client: &RatehubClient) -> Result<UserFormOutcome, FormError> {
        if self.submitting {
            return Err(FormError::SubmissionInFlight);
        }

        let outcome = match &self.mode {
            Mode::Create => {
                let name = UserName::parse(&self.name).map_err(FormError::validation)?;
                let email = Email::parse(&self.email).map_err(FormError::validation)?;
                let password = Password::parse(&self.password).map_err(FormError::validation)?;
                let input = CreateUserInput {
                    name: name.as_str().to_string(),
                    email: email.as_str().to_string(),
                    password: password.expose().to_string(),
                    address: non_blank(&self.address),
                    role: self.role,
                };

                self.submitting = true;
                let result = client.admin().create_user(input).await;
                self.submitting = false;
                UserFormOutcome::Created(result?)
            }
            Mode::Edit { id, original } => {
                let name = changed(&self.name, &original.name);
                if let Some(name) = &name {
                    UserName::parse(name).map_err(FormError::validation)?;
                }
                let email = changed(&self.email, &original.email);
                if let Some(email) = &email {
                    Email::parse(email).map_err(FormError::validation)?;
                }
                let address = changed(&self.address, original.address.as_deref().unwrap_or(""));
                let role = (self.role != original.role).then_some(self.role);

                let input = UpdateUserInput {
                    name,
                    email,
                    address,
                    role,
                };
                if input.is_empty() {
                    self.open = false;
                    return Ok(UserFormOutcome::Unchanged);
                }

                let id = *id;
                self.submitting = true;
                let result = client.admin().update_user(id, input).await;
                self.submitting = false;
                UserFormOutcome::Updated(result?)
            }
        };

        self.open = false;
        Ok(outcome)
    }
}
