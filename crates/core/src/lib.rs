//! CommerceWave Core - Shared domain types.
//!
//! This crate provides the types shared by the CommerceWave components:
//! - `storefront` - Public-facing JSON storefront service
//! - `cli` - Command-line tools for migrations and catalog inspection
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access,
//! no HTTP clients. The optional `postgres` feature adds sqlx
//! encode/decode support for the newtypes.
//!
//! # Modules
//!
//! - [`types`] - Identifiers, prices, categories, order statuses and emails

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
