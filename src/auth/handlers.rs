//! Authentication handlers

use axum::{
    extract::{Extension, Path, Query},
    http::{header::SET_COOKIE, HeaderMap},
    response::{Html, IntoResponse, Redirect},
    Json,
};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

use super::extractors::{session_cookie, ClientSession, SESSION_COOKIE};
use super::models::{
    GoogleConnectPayload, Identity, Provider, StateQuery, UserSummary,
};
use super::session::SessionService;
use crate::common::{safe_email_log, ApiError, AppState};
use crate::services::google::id_token_subject;

/// GET /login
///
/// Creates (or refreshes) the browser session, issues an anti-forgery
/// state token, and renders the login page with the token embedded.
pub async fn show_login(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    let state = state_lock.read().await.clone();
    let sessions = SessionService::new(state.db.clone());

    // Reuse the existing session when the browser already has one;
    // otherwise start fresh. A new state token is issued either way.
    let existing_id = session_cookie(&headers);

    let (session_id, state_token) = match existing_id {
        Some(id) if sessions.load(&id).await?.is_some() => {
            let token = sessions.issue_state_token(&id).await?;
            (id, token)
        }
        _ => {
            let session = sessions.create().await?;
            let token = session.state_token.clone().ok_or_else(|| {
                ApiError::InternalServer("session created without state token".to_string())
            })?;
            (session.id, token)
        }
    };

    let client_id = state.google_service.client_id().unwrap_or_default();

    let body = format!(
        r#"<!DOCTYPE html>
<html>
<head><title>Catalog - Login</title></head>
<body>
    <h1>Sign in</h1>
    <div id="signin-button"
         data-state="{state}"
         data-clientid="{client_id}"
         data-callbackurl="/gconnect?state={state}">
        Sign in with Google
    </div>
</body>
</html>
"#,
        state = state_token,
        client_id = client_id,
    );

    let cookie = format!("{}={}; Path=/; HttpOnly", SESSION_COOKIE, session_id);

    Ok(([(SET_COOKIE, cookie)], Html(body)))
}

/// POST /gconnect?state=...
///
/// Resolves a Google authorization code into a verified identity and binds
/// it to the session. The state token is checked before any provider call.
pub async fn gconnect(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    client: ClientSession,
    Query(query): Query<StateQuery>,
    Json(payload): Json<GoogleConnectPayload>,
) -> Result<Html<String>, ApiError> {
    let state = state_lock.read().await.clone();
    let session = client.session;

    if !SessionService::verify_state_token(&session, &query.state) {
        warn!(session_id = %session.id, "State token mismatch on gconnect");
        return Err(ApiError::Unauthenticated(
            "Invalid state parameter".to_string(),
        ));
    }

    let redirect_uri = payload.redirect_uri.as_deref().unwrap_or("postmessage");

    // Upgrade the authorization code into tokens
    let tokens = state
        .google_service
        .exchange_code(&payload.code, redirect_uri)
        .await?;

    // The subject claimed by the ID token must match the access token's
    // actual subject, and the token must have been issued to this app
    let id_token = tokens
        .id_token
        .as_deref()
        .ok_or_else(|| ApiError::TokenMismatch("provider returned no id token".to_string()))?;
    let subject = id_token_subject(id_token)?;

    state
        .google_service
        .verify_access_token(&tokens.access_token, &subject)
        .await?;

    // Re-connecting the same subject is informational, not an error flow
    if session.access_token.is_some() && session.provider_subject.as_deref() == Some(&subject) {
        info!(session_id = %session.id, "User is already connected");
        return Err(ApiError::AlreadyConnected(
            "Current user is already connected".to_string(),
        ));
    }

    let profile = state.google_service.userinfo(&tokens.access_token).await?;

    let sessions = SessionService::new(state.db.clone());
    let user = sessions
        .find_or_create_user(&profile.name, &profile.email, profile.picture.as_deref())
        .await?;

    let identity = Identity {
        provider: Provider::Google,
        subject,
        name: profile.name.clone(),
        email: profile.email.clone(),
        picture: profile.picture.clone(),
        access_token: tokens.access_token,
    };

    sessions.bind(&session.id, &identity, &user).await?;

    info!(
        user_id = %user.id,
        email = %safe_email_log(&user.email),
        provider = "google",
        "User authentication successful via Google OAuth"
    );

    let output = format!(
        r#"<h1>Welcome, {name}!</h1>
<img src="{picture}" style="width: 300px; height: 300px; border-radius: 150px;">"#,
        name = profile.name,
        picture = profile.picture.unwrap_or_default(),
    );

    Ok(Html(output))
}

/// GET /gdisconnect
///
/// Revokes the bound provider token, clears the session, and redirects home.
pub async fn gdisconnect(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    client: ClientSession,
) -> Result<Redirect, ApiError> {
    let state = state_lock.read().await.clone();
    let session = client.session;

    let access_token = session.access_token.as_deref().ok_or_else(|| {
        warn!(session_id = %session.id, "Disconnect without bound token");
        ApiError::NotConnected("Current user not connected".to_string())
    })?;

    state.google_service.revoke(access_token).await?;

    let sessions = SessionService::new(state.db.clone());
    sessions.clear(&session.id).await?;

    info!(session_id = %session.id, "User disconnected");

    Ok(Redirect::to("/catalog"))
}

/// GET /disconnect
///
/// Routes to the provider-specific disconnect flow. Sessions without a
/// recorded provider fall back to the Google flow; this default is
/// intentional, not a swallowed error.
pub async fn disconnect(client: ClientSession) -> Redirect {
    let provider = client
        .session
        .provider
        .as_deref()
        .and_then(Provider::parse)
        .unwrap_or(Provider::Google);

    Redirect::to(provider.disconnect_path())
}

/// GET /users.json - public projection of all users (id and name only)
pub async fn users_json(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let state = state_lock.read().await.clone();
    let sessions = SessionService::new(state.db.clone());

    let users = sessions.list_users().await?;
    let summaries: Vec<UserSummary> = users.iter().map(UserSummary::from).collect();

    Ok(Json(serde_json::json!({ "Users": summaries })))
}

/// GET /user/:username/:email - user detail view
pub async fn show_user(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    Path((username, email)): Path<(String, String)>,
) -> Result<Html<String>, ApiError> {
    let state = state_lock.read().await.clone();
    let sessions = SessionService::new(state.db.clone());

    let user = sessions.user_by_name_and_email(&username, &email).await?;

    let picture = user
        .picture
        .as_deref()
        .map(|url| format!(r#"<img src="{}" alt="avatar">"#, url))
        .unwrap_or_default();

    Ok(Html(format!(
        r#"<!DOCTYPE html>
<html>
<head><title>{name}</title></head>
<body>
    <h1>{name}</h1>
    {picture}
    <p>{email}</p>
</body>
</html>
"#,
        name = user.name,
        picture = picture,
        email = user.email,
    )))
}
