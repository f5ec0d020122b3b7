//! Dialog-style form controllers.
//!
//! Each controller owns a draft initialized from server state when the
//! dialog opens, validates locally before any network call, and submits
//! through the query layer so the right cache entries are invalidated.
//! Re-opening a form re-syncs from the server, discarding any cancelled
//! edit. Edit-mode submissions send only the fields that changed; a draft
//! with no changes skips the network entirely.

mod password;
mod profile;
mod rating;
mod store;
mod user;

pub use password::PasswordForm;
pub use profile::ProfileForm;
pub use rating::RatingForm;
pub use store::{StoreForm, StoreFormOutcome};
pub use user::{UserForm, UserFormOutcome};

use thiserror::Error;

use crate::error::ApiError;

/// Why a form submission did not go through.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FormError {
    /// The server rejected the submission; the message is shown verbatim
    /// and the form stays open.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The draft failed local validation; nothing was sent.
    #[error("{0}")]
    Validation(String),

    /// A previous submission has not settled yet.
    #[error("a submission is already in flight")]
    SubmissionInFlight,
}

impl FormError {
    fn validation(err: impl std::fmt::Display) -> Self {
        Self::Validation(err.to_string())
    }
}

/// Empty optional field helper: blank input means "not provided".
fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Diff helper for edit mode: `None` when the draft matches the original.
fn changed(draft: &str, original: &str) -> Option<String> {
    if draft.trim() == original {
        None
    } else {
        Some(draft.trim().to_string())
    }
}
