//! # Catalog Module
//!
//! This module handles the category → item catalog including:
//! - Typed entity access with natural-key lookups (CatalogStore)
//! - Ownership-enforced mutations (CatalogService)
//! - Public read views and JSON projections

pub mod handlers;
pub mod models;
pub mod routes;
pub mod service;
pub mod store;
pub mod validators;

#[cfg(test)]
mod tests;

pub use routes::catalog_routes;
