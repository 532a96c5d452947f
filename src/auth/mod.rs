//! # Auth Module
//!
//! This module handles all authentication-related functionality including:
//! - Google OAuth connect/disconnect flows
//! - Anti-forgery state token issuance and verification
//! - Server-side browser sessions and the SessionUser extractor
//! - Local user accounts created on first login

pub mod extractors;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod session;

#[cfg(test)]
mod tests;

pub use extractors::{MaybeSessionUser, SessionUser};
pub use routes::auth_routes;
