//! Typed query facades over the cache and HTTP adapter.
//!
//! Each domain module owns its cache keys, freshness windows, retry
//! choices, and mutation invalidation plans, so call sites never spell out
//! a [`QueryKey`](crate::cache::QueryKey) by hand. Facades are cheap
//! borrows handed out by [`RatehubClient`](crate::RatehubClient).

mod admin;
mod auth;
mod owner;
mod ratings;
mod stores;

pub use admin::Admin;
pub use auth::Auth;
pub use owner::Owner;
pub use ratings::Ratings;
pub use stores::Stores;

use std::sync::Arc;

use crate::error::ApiError;

/// Unwrap data from an always-enabled query.
fn require<T>(data: Option<Arc<T>>) -> Result<Arc<T>, ApiError> {
    data.ok_or_else(|| ApiError::Internal("query unexpectedly disabled".to_string()))
}

/// Unwrap data from a query that requires a session.
fn require_auth<T>(data: Option<Arc<T>>) -> Result<Arc<T>, ApiError> {
    data.ok_or(ApiError::NotAuthenticated)
}
