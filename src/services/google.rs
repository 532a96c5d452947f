// src/services/google.rs
//! Google OAuth integration: code exchange, token verification, profile
//! lookup, and token revocation. The provider is consumed as a black box;
//! everything here speaks plain HTTPS via reqwest.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::common::helpers::safe_token_log;

const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const TOKENINFO_URL: &str = "https://www.googleapis.com/oauth2/v1/tokeninfo";
const USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v1/userinfo";
const REVOKE_URL: &str = "https://accounts.google.com/o/oauth2/revoke";

#[derive(Debug, Error)]
pub enum GoogleError {
    #[error("Google OAuth not configured")]
    NotConfigured,

    #[error("Failed to upgrade the authorization code: {0}")]
    ExchangeFailed(String),

    #[error("Token verification failed: {0}")]
    TokenMismatch(String),

    #[error("Failed to revoke token: {0}")]
    RevokeFailed(String),

    #[error("HTTP request failed: {0}")]
    RequestFailed(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub expires_in: i64,
    pub token_type: String,
    pub refresh_token: Option<String>,
    pub id_token: Option<String>,
    pub scope: Option<String>,
}

/// Subset of Google's tokeninfo response used for verification
#[derive(Debug, Deserialize)]
pub struct TokenInfo {
    pub user_id: String,
    pub issued_to: String,
}

/// Verified profile from Google's userinfo endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct GoogleProfile {
    pub id: String,
    pub name: String,
    pub email: String,
    pub picture: Option<String>,
}

#[derive(Debug, Clone)]
pub struct GoogleService {
    client_id: Option<String>,
    client_secret: Option<String>,
    client: Client,
}

impl GoogleService {
    pub fn new(client_id: Option<String>, client_secret: Option<String>, client: Client) -> Self {
        Self {
            client_id,
            client_secret,
            client,
        }
    }

    /// The application's registered client identifier, if configured
    pub fn client_id(&self) -> Option<&str> {
        self.client_id.as_deref()
    }

    fn credentials(&self) -> Result<(&str, &str), GoogleError> {
        match (self.client_id.as_deref(), self.client_secret.as_deref()) {
            (Some(id), Some(secret)) => Ok((id, secret)),
            _ => Err(GoogleError::NotConfigured),
        }
    }

    /// Exchange an authorization code for tokens
    pub async fn exchange_code(
        &self,
        code: &str,
        redirect_uri: &str,
    ) -> Result<TokenResponse, GoogleError> {
        let (client_id, client_secret) = self.credentials()?;

        let params = [
            ("code", code),
            ("client_id", client_id),
            ("client_secret", client_secret),
            ("redirect_uri", redirect_uri),
            ("grant_type", "authorization_code"),
        ];

        debug!("Exchanging authorization code for tokens");

        let response = self
            .client
            .post(TOKEN_URL)
            .form(&params)
            .send()
            .await
            .map_err(|e| GoogleError::RequestFailed(e.to_string()))?;

        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            error!(status = %status, error = %error_text, "Token exchange failed");
            return Err(GoogleError::ExchangeFailed(format!(
                "HTTP {}: {}",
                status, error_text
            )));
        }

        let token_response = response
            .json::<TokenResponse>()
            .await
            .map_err(|e| GoogleError::SerializationError(e.to_string()))?;

        info!("Successfully exchanged authorization code for tokens");
        Ok(token_response)
    }

    /// Verify an access token against the expected subject and this
    /// application's client id via Google's tokeninfo endpoint
    pub async fn verify_access_token(
        &self,
        access_token: &str,
        expected_subject: &str,
    ) -> Result<TokenInfo, GoogleError> {
        let (client_id, _) = self.credentials()?;

        let response = self
            .client
            .get(TOKENINFO_URL)
            .query(&[("access_token", access_token)])
            .send()
            .await
            .map_err(|e| GoogleError::RequestFailed(e.to_string()))?;

        if !response.status().is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            warn!(error = %error_text, "Tokeninfo lookup rejected access token");
            return Err(GoogleError::TokenMismatch(error_text));
        }

        let info = response
            .json::<TokenInfo>()
            .await
            .map_err(|e| GoogleError::SerializationError(e.to_string()))?;

        if info.user_id != expected_subject {
            warn!(
                token_subject = %info.user_id,
                expected = %expected_subject,
                "Token's user ID doesn't match given user ID"
            );
            return Err(GoogleError::TokenMismatch(
                "Token's user ID doesn't match given user ID".to_string(),
            ));
        }

        if info.issued_to != client_id {
            warn!(
                token_audience = %info.issued_to,
                expected_client_id = %client_id,
                "Token's client ID doesn't match app's"
            );
            return Err(GoogleError::TokenMismatch(
                "Token's client ID doesn't match app's".to_string(),
            ));
        }

        debug!("Access token subject and audience verified");
        Ok(info)
    }

    /// Fetch the user's profile with a verified access token
    pub async fn userinfo(&self, access_token: &str) -> Result<GoogleProfile, GoogleError> {
        let response = self
            .client
            .get(USERINFO_URL)
            .query(&[("access_token", access_token), ("alt", "json")])
            .send()
            .await
            .map_err(|e| GoogleError::RequestFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(GoogleError::RequestFailed(
                "Failed to get user info".to_string(),
            ));
        }

        response
            .json::<GoogleProfile>()
            .await
            .map_err(|e| GoogleError::SerializationError(e.to_string()))
    }

    /// Revoke an access token at the provider
    pub async fn revoke(&self, access_token: &str) -> Result<(), GoogleError> {
        let response = self
            .client
            .get(REVOKE_URL)
            .query(&[("token", access_token)])
            .send()
            .await
            .map_err(|e| GoogleError::RequestFailed(e.to_string()))?;

        if !response.status().is_success() {
            warn!(
                status = %response.status(),
                token = %safe_token_log(access_token),
                "Provider did not acknowledge token revocation"
            );
            return Err(GoogleError::RevokeFailed(
                "Failed to revoke token for given user".to_string(),
            ));
        }

        info!("Provider token revoked");
        Ok(())
    }
}

/// Extract the `sub` claim from an ID token without verifying its signature.
/// The token was just received directly from Google over TLS; the subsequent
/// tokeninfo check is the authoritative verification step.
pub fn id_token_subject(id_token: &str) -> Result<String, GoogleError> {
    let payload = id_token
        .split('.')
        .nth(1)
        .ok_or_else(|| GoogleError::SerializationError("malformed id_token".to_string()))?;

    let decoded = URL_SAFE_NO_PAD
        .decode(payload)
        .map_err(|e| GoogleError::SerializationError(e.to_string()))?;

    #[derive(Deserialize)]
    struct IdClaims {
        sub: String,
    }

    let claims: IdClaims = serde_json::from_slice(&decoded)
        .map_err(|e| GoogleError::SerializationError(e.to_string()))?;

    Ok(claims.sub)
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use base64::Engine;

    fn fake_id_token(sub: &str) -> String {
        let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"RS256","typ":"JWT"}"#);
        let payload = URL_SAFE_NO_PAD.encode(format!(r#"{{"sub":"{}","aud":"app"}}"#, sub));
        format!("{}.{}.signature", header, payload)
    }

    #[test]
    fn test_id_token_subject_extraction() {
        let token = fake_id_token("108716655:300");
        assert_eq!(id_token_subject(&token).unwrap(), "108716655:300");
    }

    #[test]
    fn test_id_token_subject_rejects_malformed() {
        assert!(id_token_subject("not-a-jwt").is_err());
        assert!(id_token_subject("a.!!!.c").is_err());
    }

    #[test]
    fn test_unconfigured_service_reports_not_configured() {
        let service = GoogleService::new(None, None, Client::new());
        assert!(matches!(
            service.credentials(),
            Err(GoogleError::NotConfigured)
        ));
    }
}
