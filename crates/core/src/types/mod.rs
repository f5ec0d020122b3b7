//! Core types for the Ratehub platform.

pub mod dashboard;
pub mod email;
pub mod filter;
pub mod name;
pub mod password;
pub mod rating;
pub mod role;
pub mod store;
pub mod user;

pub use dashboard::{AdminDashboard, OwnerDashboard, RaterSummary};
pub use email::{Email, EmailError};
pub use filter::{
    OwnerRatingFilter, Paginated, PageMeta, SortOrder, StoreFilter, StoreSearch, UserFilter,
};
pub use name::{UserName, UserNameError};
pub use password::{Password, PasswordError};
pub use rating::{Rating, RatingValue, RatingValueError};
pub use role::Role;
pub use store::Store;
pub use user::User;
