//! Authentication data models

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// User database model
#[derive(FromRow, Serialize, Deserialize, Debug, Clone)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub picture: Option<String>,
    pub created_at: Option<String>,
}

/// Public JSON projection of a user: id and name only, never email or picture
#[derive(Serialize, Debug)]
pub struct UserSummary {
    pub id: String,
    pub name: String,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            name: user.name.clone(),
        }
    }
}

/// Server-side browser session with named, typed identity fields.
/// All identity fields are set together by `bind` and removed together
/// by `clear`.
#[derive(FromRow, Debug, Clone)]
pub struct Session {
    pub id: String,
    pub state_token: Option<String>,
    pub user_id: Option<String>,
    pub user_name: Option<String>,
    pub user_email: Option<String>,
    pub user_picture: Option<String>,
    pub provider: Option<String>,
    pub provider_subject: Option<String>,
    pub access_token: Option<String>,
    pub created_at: Option<String>,
}

/// Closed set of supported identity providers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Google,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Google => "google",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "google" => Some(Provider::Google),
            _ => None,
        }
    }

    /// Path of the provider-specific disconnect endpoint
    pub fn disconnect_path(&self) -> &'static str {
        match self {
            Provider::Google => "/gdisconnect",
        }
    }
}

/// Verified identity produced by the connect flow
#[derive(Debug, Clone)]
pub struct Identity {
    pub provider: Provider,
    pub subject: String,
    pub name: String,
    pub email: String,
    pub picture: Option<String>,
    pub access_token: String,
}

/// Request body for POST /gconnect
#[derive(Deserialize)]
pub struct GoogleConnectPayload {
    pub code: String,
    /// Redirect target used during the authorization step; the JavaScript
    /// popup flow uses the "postmessage" sentinel.
    pub redirect_uri: Option<String>,
}

/// Query parameters for POST /gconnect
#[derive(Deserialize)]
pub struct StateQuery {
    pub state: String,
}
