//! Server-side session management and local user accounts.
//!
//! Sessions live in the `sessions` table and are addressed by an opaque
//! cookie value. Identity fields have an explicit lifecycle: `bind` on
//! login, `clear` on logout.

use sqlx::SqlitePool;
use tracing::{debug, info};

use super::models::{Identity, Session, User};
use crate::common::{
    constant_time_eq, generate_raw_id, generate_session_id, generate_user_id, safe_email_log,
    ApiError,
};

/// Length of the anti-forgery state token in Crockford Base32 characters
const STATE_TOKEN_LEN: usize = 32;

pub struct SessionService {
    db: SqlitePool,
}

impl SessionService {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    // ========================================================================
    // Session lifecycle
    // ========================================================================

    /// Create a fresh session with a newly issued state token
    pub async fn create(&self) -> Result<Session, ApiError> {
        let session_id = generate_session_id();
        let state_token = generate_raw_id(STATE_TOKEN_LEN);

        sqlx::query("INSERT INTO sessions (id, state_token) VALUES (?, ?)")
            .bind(&session_id)
            .bind(&state_token)
            .execute(&self.db)
            .await
            .map_err(ApiError::DatabaseError)?;

        debug!(session_id = %session_id, "Created session");

        self.require(&session_id).await
    }

    /// Load a session by its cookie value
    pub async fn load(&self, session_id: &str) -> Result<Option<Session>, ApiError> {
        sqlx::query_as::<_, Session>("SELECT * FROM sessions WHERE id = ?")
            .bind(session_id)
            .fetch_optional(&self.db)
            .await
            .map_err(ApiError::DatabaseError)
    }

    async fn require(&self, session_id: &str) -> Result<Session, ApiError> {
        self.load(session_id)
            .await?
            .ok_or_else(|| ApiError::Unauthenticated("no active session".to_string()))
    }

    /// Issue a new anti-forgery state token for an existing session
    pub async fn issue_state_token(&self, session_id: &str) -> Result<String, ApiError> {
        let state_token = generate_raw_id(STATE_TOKEN_LEN);

        sqlx::query("UPDATE sessions SET state_token = ? WHERE id = ?")
            .bind(&state_token)
            .bind(session_id)
            .execute(&self.db)
            .await
            .map_err(ApiError::DatabaseError)?;

        Ok(state_token)
    }

    /// Compare a presented state token against the one stored for the
    /// session. Constant-effort; rejects when no token was ever issued.
    pub fn verify_state_token(session: &Session, presented: &str) -> bool {
        match session.state_token.as_deref() {
            Some(stored) => constant_time_eq(stored, presented),
            None => false,
        }
    }

    /// Bind a resolved identity to the session
    pub async fn bind(
        &self,
        session_id: &str,
        identity: &Identity,
        user: &User,
    ) -> Result<(), ApiError> {
        sqlx::query(
            r#"
            UPDATE sessions
            SET user_id = ?, user_name = ?, user_email = ?, user_picture = ?,
                provider = ?, provider_subject = ?, access_token = ?
            WHERE id = ?
            "#,
        )
        .bind(&user.id)
        .bind(&identity.name)
        .bind(&identity.email)
        .bind(&identity.picture)
        .bind(identity.provider.as_str())
        .bind(&identity.subject)
        .bind(&identity.access_token)
        .bind(session_id)
        .execute(&self.db)
        .await
        .map_err(ApiError::DatabaseError)?;

        info!(
            session_id = %session_id,
            user_id = %user.id,
            email = %safe_email_log(&identity.email),
            "Bound identity to session"
        );

        Ok(())
    }

    /// Remove all identity fields from the session
    pub async fn clear(&self, session_id: &str) -> Result<(), ApiError> {
        sqlx::query(
            r#"
            UPDATE sessions
            SET user_id = NULL, user_name = NULL, user_email = NULL,
                user_picture = NULL, provider = NULL, provider_subject = NULL,
                access_token = NULL
            WHERE id = ?
            "#,
        )
        .bind(session_id)
        .execute(&self.db)
        .await
        .map_err(ApiError::DatabaseError)?;

        info!(session_id = %session_id, "Cleared session identity");

        Ok(())
    }

    /// The local user currently bound to the session, if any
    pub async fn current_user(&self, session: &Session) -> Result<Option<User>, ApiError> {
        match session.user_id.as_deref() {
            Some(user_id) => self.find_user_by_id(user_id).await,
            None => Ok(None),
        }
    }

    // ========================================================================
    // Local user accounts
    // ========================================================================

    pub async fn find_user_by_id(&self, user_id: &str) -> Result<Option<User>, ApiError> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
            .bind(user_id)
            .fetch_optional(&self.db)
            .await
            .map_err(ApiError::DatabaseError)
    }

    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, ApiError> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.db)
            .await
            .map_err(ApiError::DatabaseError)
    }

    /// Natural-key lookup by display name and email. Zero or ambiguous
    /// matches are reported as NotFound rather than returning an
    /// arbitrary row.
    pub async fn user_by_name_and_email(
        &self,
        name: &str,
        email: &str,
    ) -> Result<User, ApiError> {
        let mut rows =
            sqlx::query_as::<_, User>("SELECT * FROM users WHERE name = ? AND email = ?")
                .bind(name)
                .bind(email)
                .fetch_all(&self.db)
                .await
                .map_err(ApiError::DatabaseError)?;

        match rows.pop() {
            Some(user) if rows.is_empty() => Ok(user),
            _ => Err(ApiError::NotFound("User not found".to_string())),
        }
    }

    pub async fn create_user(
        &self,
        name: &str,
        email: &str,
        picture: Option<&str>,
    ) -> Result<User, ApiError> {
        let user_id = generate_user_id();

        sqlx::query("INSERT INTO users (id, name, email, picture) VALUES (?, ?, ?, ?)")
            .bind(&user_id)
            .bind(name)
            .bind(email)
            .bind(picture)
            .execute(&self.db)
            .await
            .map_err(ApiError::DatabaseError)?;

        info!(
            user_id = %user_id,
            email = %safe_email_log(email),
            "Created new user account"
        );

        self.find_user_by_id(&user_id)
            .await?
            .ok_or_else(|| ApiError::InternalServer("user vanished after insert".to_string()))
    }

    /// Look up a user by email, creating one on first sight. The email is
    /// the identity key: an existing account keeps its original name and
    /// picture.
    pub async fn find_or_create_user(
        &self,
        name: &str,
        email: &str,
        picture: Option<&str>,
    ) -> Result<User, ApiError> {
        if let Some(existing) = self.find_user_by_email(email).await? {
            debug!(
                user_id = %existing.id,
                email = %safe_email_log(email),
                "Found existing user"
            );
            return Ok(existing);
        }

        self.create_user(name, email, picture).await
    }

    pub async fn list_users(&self) -> Result<Vec<User>, ApiError> {
        sqlx::query_as::<_, User>("SELECT * FROM users ORDER BY name ASC")
            .fetch_all(&self.db)
            .await
            .map_err(ApiError::DatabaseError)
    }
}
