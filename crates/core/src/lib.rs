//! Ratehub Core - Shared types library.
//!
//! Data types exchanged with the Ratehub REST API, shared by the client
//! library and the CLI.
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients. Everything
//! here is a DTO owned by the server and borrowed briefly by clients, plus a
//! handful of validated newtypes that enforce the platform's field rules
//! before a request is ever made.
//!
//! # Modules
//!
//! - [`types`] - DTOs, list filters, and validated value types

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
