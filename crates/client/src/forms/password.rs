//! Change-password dialog. The new password is validated against the
//! platform rule (8-16 chars, an uppercase letter and a special character)
//! before anything is sent.

use ratehub_core::Password;

use crate::RatehubClient;
use crate::forms::FormError;

#[derive(Debug, Default)]
pub struct PasswordForm {
    pub current: String,
    pub new: String,
    pub confirm: String,
    submitting: bool,
}

impl PasswordForm {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// # Errors
    ///
    /// [`FormError::Validation`] when the new password breaks the rule or
    /// the confirmation does not match; [`FormError::Api`] with the
    /// server's message, e.g. a wrong current password.
    pub async fn submit(&mut self, client: &RatehubClient) -> Result<(), FormError> {
        if self.submitting {
            return Err(FormError::SubmissionInFlight);
        }
        if self.current.is_empty() {
            return Err(FormError::Validation(
                "current password is required".to_string(),
            ));
        }
        let new = Password::parse(&self.new).map_err(FormError::validation)?;
        if self.new != self.confirm {
            return Err(FormError::Validation("passwords do not match".to_string()));
        }

        self.submitting = true;
        let result = client
            .auth()
            .change_password(&self.current, new.expose())
            .await;
        self.submitting = false;

        result?;
        // Drafts holding passwords do not outlive the submission.
        self.current.clear();
        self.new.clear();
        self.confirm.clear();
        Ok(())
    }
}
