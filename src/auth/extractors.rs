//! Session extractors for Axum

use async_trait::async_trait;
use axum::{
    extract::{Extension, FromRequestParts},
    http::{header::COOKIE, request::Parts, HeaderMap},
};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use super::models::Session;
use super::session::SessionService;
use crate::common::{safe_email_log, ApiError, AppState};

/// Name of the session cookie
pub const SESSION_COOKIE: &str = "catalog_session";

/// Pull the session cookie value out of the request headers
pub fn session_cookie(headers: &HeaderMap) -> Option<String> {
    headers
        .get(COOKIE)
        .and_then(|h| h.to_str().ok())
        .and_then(|cookies| {
            cookies.split(';').find_map(|cookie| {
                cookie
                    .trim()
                    .strip_prefix(SESSION_COOKIE)
                    .and_then(|rest| rest.strip_prefix('='))
                    .map(str::to_string)
            })
        })
}

async fn shared_state(parts: &mut Parts) -> Result<AppState, ApiError> {
    let Extension(state_lock): Extension<Arc<RwLock<AppState>>> =
        Extension::from_request_parts(parts, &())
            .await
            .map_err(|_| ApiError::InternalServer("missing app state".to_string()))?;

    let state = state_lock.read().await.clone();
    Ok(state)
}

/// The browser session for this request, authenticated or not.
/// Rejects when no session cookie is presented or the session is unknown.
#[derive(Debug)]
pub struct ClientSession {
    pub session: Session,
}

#[async_trait]
impl<S> FromRequestParts<S> for ClientSession
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let app_state = shared_state(parts).await?;

        let session_id = match session_cookie(&parts.headers) {
            Some(id) => id,
            None => {
                warn!("Request without session cookie");
                return Err(ApiError::Unauthenticated("no active session".to_string()));
            }
        };

        let sessions = SessionService::new(app_state.db.clone());
        match sessions.load(&session_id).await? {
            Some(session) => Ok(ClientSession { session }),
            None => {
                warn!(session_id = %session_id, "Unknown session cookie presented");
                Err(ApiError::Unauthenticated("no active session".to_string()))
            }
        }
    }
}

/// Authenticated user extractor
///
/// Requires a session with a bound local user; handlers taking this
/// extractor are only reachable by logged-in users.
#[derive(Debug, Clone)]
pub struct SessionUser {
    pub session_id: String,
    pub id: String,
    pub name: String,
    pub email: String,
    pub picture: Option<String>,
}

#[async_trait]
impl<S> FromRequestParts<S> for SessionUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let ClientSession { session } = ClientSession::from_request_parts(parts, state).await?;

        let user_id = session.user_id.clone().ok_or_else(|| {
            warn!(session_id = %session.id, "Session has no bound user");
            ApiError::Unauthenticated("login required".to_string())
        })?;

        debug!(
            session_id = %session.id,
            user_id = %user_id,
            email = %session
                .user_email
                .as_deref()
                .map(safe_email_log)
                .unwrap_or_default(),
            "Session user resolved"
        );

        Ok(SessionUser {
            session_id: session.id,
            id: user_id,
            name: session.user_name.unwrap_or_default(),
            email: session.user_email.unwrap_or_default(),
            picture: session.user_picture,
        })
    }
}

/// Optional variant of [`SessionUser`] for owner-aware public views.
/// Never rejects; anonymous requests yield `MaybeSessionUser(None)`.
#[derive(Debug)]
pub struct MaybeSessionUser(pub Option<SessionUser>);

#[async_trait]
impl<S> FromRequestParts<S> for MaybeSessionUser
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Ok(MaybeSessionUser(
            SessionUser::from_request_parts(parts, state).await.ok(),
        ))
    }
}
