//! External service integrations

pub mod google;

pub use google::GoogleService;
