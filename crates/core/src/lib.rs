//! Storedesk Core - Shared domain types.
//!
//! This crate provides the types used across the Storedesk components:
//! - `api` - REST backend for stores, staff and targets
//! - `cli` - Command-line tools for migrations, seeding and user management
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access,
//! no HTTP. Database encoding is available behind the `postgres` feature.
//!
//! # Modules
//!
//! - [`types`] - Typed IDs, emails, and the closed value sets (statuses,
//!   metric and period types, staff roles)

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
