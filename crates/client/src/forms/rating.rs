//! Create/edit unification for the rating dialog.
//!
//! Opening the dialog looks up the caller's existing rating for the store.
//! Found one: the draft pre-fills and submission updates it. Found none:
//! the draft starts empty and submission creates one. Callers never choose
//! the mode themselves.

use ratehub_core::{Rating, RatingValue};

use crate::RatehubClient;
use crate::error::ApiError;
use crate::forms::FormError;

#[derive(Debug)]
pub struct RatingForm {
    store_id: i64,
    /// Id of the rating being edited; `None` means create mode.
    existing: Option<i64>,
    value: Option<u8>,
    comment: String,
    submitting: bool,
    open: bool,
}

impl RatingForm {
    /// Open the dialog for a store, pre-filling from the caller's existing
    /// rating when there is one.
    ///
    /// # Errors
    ///
    /// Any lookup failure other than "no rating yet".
    pub async fn open(client: &RatehubClient, store_id: i64) -> Result<Self, ApiError> {
        let existing = client.ratings().for_store(store_id).await?;

        Ok(existing.map_or_else(
            || Self {
                store_id,
                existing: None,
                value: None,
                comment: String::new(),
                submitting: false,
                open: true,
            },
            |rating| Self {
                store_id,
                existing: Some(rating.id),
                value: Some(rating.value),
                comment: rating.comment.clone().unwrap_or_default(),
                submitting: false,
                open: true,
            },
        ))
    }

    #[must_use]
    pub const fn is_edit(&self) -> bool {
        self.existing.is_some()
    }

    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.open
    }

    pub const fn set_value(&mut self, value: u8) {
        self.value = Some(value);
    }

    pub fn set_comment(&mut self, comment: impl Into<String>) {
        self.comment = comment.into();
    }

    /// Close without submitting. Refused while a submission is in flight.
    pub const fn close(&mut self) -> Result<(), FormError> {
        if self.submitting {
            return Err(FormError::SubmissionInFlight);
        }
        self.open = false;
        Ok(())
    }

    /// Validate and submit the draft, dispatching update vs create based
    /// on how the dialog was opened. Success closes the dialog; failure
    /// leaves it open with the draft intact.
    ///
    /// # Errors
    ///
    /// [`FormError::Validation`] before any network call for a missing or
    /// out-of-range value; [`FormError::Api`] with the server's message on
    /// rejection.
    pub async fn submit(&mut self, client: &RatehubClient) -> Result<Rating, FormError> {
        if self.submitting {
            return Err(FormError::SubmissionInFlight);
        }
        let raw = self
            .value
            .ok_or_else(|| FormError::Validation("select a rating first".to_string()))?;
        let value = RatingValue::new(raw).map_err(FormError::validation)?;
        let comment = crate::forms::non_blank(&self.comment);

        self.submitting = true;
        let result = match self.existing {
            Some(rating_id) => {
                client
                    .ratings()
                    .update(rating_id, self.store_id, value, comment)
                    .await
            }
            None => client.ratings().create(self.store_id, value, comment).await,
        };
        self.submitting = false;

        let rating = result?;
        self.existing = Some(rating.id);
        self.open = false;
        Ok(rating)
    }

    /// Delete the existing rating and close the dialog.
    ///
    /// # Errors
    ///
    /// [`FormError::Validation`] when there is no rating to delete;
    /// [`FormError::Api`] on server rejection.
    pub async fn delete(&mut self, client: &RatehubClient) -> Result<(), FormError> {
        if self.submitting {
            return Err(FormError::SubmissionInFlight);
        }
        let rating_id = self
            .existing
            .ok_or_else(|| FormError::Validation("no rating to delete".to_string()))?;

        self.submitting = true;
        let result = client.ratings().delete(rating_id, self.store_id).await;
        self.submitting = false;

        result?;
        self.existing = None;
        self.open = false;
        Ok(())
    }
}
