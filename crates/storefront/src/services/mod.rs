//! Business logic services for the storefront.
//!
//! # Services
//!
//! - `auth` - Account sign-up, sign-in and profile updates behind [`auth::AuthProvider`]

pub mod auth;
