//! Tests for auth module
//!
//! These tests verify session lifecycle, anti-forgery state tokens,
//! find-or-create user semantics, and the provider dispatch type.

#[cfg(test)]
mod tests {
    use super::super::extractors::ClientSession;
    use super::super::handlers;
    use super::super::models::{
        GoogleConnectPayload, Identity, Provider, StateQuery, User, UserSummary,
    };
    use super::super::session::SessionService;
    use crate::common::migrations::run_migrations;
    use crate::common::{ApiError, AppState};
    use crate::services::GoogleService;
    use axum::extract::{Extension, Query};
    use axum::Json;
    use reqwest::Client;
    use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
    use sqlx::SqlitePool;
    use std::str::FromStr;
    use std::sync::Arc;
    use tokio::sync::RwLock;

    async fn test_pool() -> SqlitePool {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .expect("connect options")
            .foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .expect("pool");
        run_migrations(&pool).await.expect("migrations");
        pool
    }

    fn google_identity(subject: &str, user: &User) -> Identity {
        Identity {
            provider: Provider::Google,
            subject: subject.to_string(),
            name: user.name.clone(),
            email: user.email.clone(),
            picture: user.picture.clone(),
            access_token: "ya29.test-token".to_string(),
        }
    }

    #[tokio::test]
    async fn test_new_session_carries_state_token() {
        let pool = test_pool().await;
        let sessions = SessionService::new(pool.clone());

        let session = sessions.create().await.expect("session");

        assert!(session.id.starts_with("S_"));
        let token = session.state_token.as_deref().expect("state token issued");
        assert_eq!(token.len(), 32);
        assert!(session.user_id.is_none());
    }

    #[tokio::test]
    async fn test_state_token_verification() {
        let pool = test_pool().await;
        let sessions = SessionService::new(pool.clone());

        let session = sessions.create().await.expect("session");
        let token = session.state_token.clone().expect("token");

        assert!(SessionService::verify_state_token(&session, &token));
        assert!(!SessionService::verify_state_token(&session, "FORGED"));
        assert!(!SessionService::verify_state_token(&session, ""));

        // Re-issuing invalidates the previous token
        let fresh = sessions
            .issue_state_token(&session.id)
            .await
            .expect("reissue");
        let reloaded = sessions
            .load(&session.id)
            .await
            .expect("load")
            .expect("session exists");
        assert!(SessionService::verify_state_token(&reloaded, &fresh));
        assert!(!SessionService::verify_state_token(&reloaded, &token));
    }

    #[tokio::test]
    async fn test_gconnect_rejects_forged_state_before_provider_call() {
        let pool = test_pool().await;
        let sessions = SessionService::new(pool.clone());
        let session = sessions.create().await.expect("session");

        // The provider is deliberately unconfigured: had gconnect reached
        // the code exchange, the error would be InternalServer
        // (NotConfigured), not Unauthenticated.
        let state = AppState {
            db: pool.clone(),
            google_service: Arc::new(GoogleService::new(None, None, Client::new())),
        };

        let result = handlers::gconnect(
            Extension(Arc::new(RwLock::new(state))),
            ClientSession { session },
            Query(StateQuery {
                state: "FORGED".to_string(),
            }),
            Json(GoogleConnectPayload {
                code: "4/0AbCdEf".to_string(),
                redirect_uri: None,
            }),
        )
        .await;

        assert!(matches!(result, Err(ApiError::Unauthenticated(_))));
    }

    #[tokio::test]
    async fn test_bind_and_clear_lifecycle() {
        let pool = test_pool().await;
        let sessions = SessionService::new(pool.clone());

        let session = sessions.create().await.expect("session");
        let user = sessions
            .create_user("Alice", "alice@example.com", Some("https://img/a.png"))
            .await
            .expect("user");

        sessions
            .bind(&session.id, &google_identity("1087:300", &user), &user)
            .await
            .expect("bind");

        let bound = sessions
            .load(&session.id)
            .await
            .expect("load")
            .expect("session exists");
        assert_eq!(bound.user_id.as_deref(), Some(user.id.as_str()));
        assert_eq!(bound.user_email.as_deref(), Some("alice@example.com"));
        assert_eq!(bound.provider.as_deref(), Some("google"));
        assert_eq!(bound.provider_subject.as_deref(), Some("1087:300"));
        assert_eq!(bound.access_token.as_deref(), Some("ya29.test-token"));

        let current = sessions.current_user(&bound).await.expect("current");
        assert_eq!(current.map(|u| u.id), Some(user.id.clone()));

        sessions.clear(&session.id).await.expect("clear");

        let cleared = sessions
            .load(&session.id)
            .await
            .expect("load")
            .expect("session exists");
        assert!(cleared.user_id.is_none());
        assert!(cleared.user_email.is_none());
        assert!(cleared.provider.is_none());
        assert!(cleared.provider_subject.is_none());
        assert!(cleared.access_token.is_none());
        assert!(sessions
            .current_user(&cleared)
            .await
            .expect("current")
            .is_none());
    }

    #[tokio::test]
    async fn test_find_or_create_user_is_keyed_by_email() {
        let pool = test_pool().await;
        let sessions = SessionService::new(pool.clone());

        let first = sessions
            .find_or_create_user("Alice", "alice@example.com", Some("https://img/a.png"))
            .await
            .expect("first");

        // Same email: same account, even with a changed display name
        let again = sessions
            .find_or_create_user("Alice Cooper", "alice@example.com", None)
            .await
            .expect("again");
        assert_eq!(again.id, first.id);
        assert_eq!(again.name, "Alice");

        // New email: new account with the resolver-supplied profile
        let other = sessions
            .find_or_create_user("Bob", "bob@example.com", Some("https://img/b.png"))
            .await
            .expect("other");
        assert_ne!(other.id, first.id);
        assert_eq!(other.name, "Bob");
        assert_eq!(other.picture.as_deref(), Some("https://img/b.png"));
    }

    #[tokio::test]
    async fn test_user_by_name_and_email_reports_not_found() {
        let pool = test_pool().await;
        let sessions = SessionService::new(pool.clone());

        sessions
            .create_user("Alice", "alice@example.com", None)
            .await
            .expect("user");

        let found = sessions
            .user_by_name_and_email("Alice", "alice@example.com")
            .await
            .expect("found");
        assert_eq!(found.email, "alice@example.com");

        assert!(matches!(
            sessions
                .user_by_name_and_email("Alice", "wrong@example.com")
                .await,
            Err(ApiError::NotFound(_))
        ));
    }

    #[test]
    fn test_provider_dispatch() {
        assert_eq!(Provider::parse("google"), Some(Provider::Google));
        assert_eq!(Provider::parse("facebook"), None);
        assert_eq!(Provider::Google.as_str(), "google");
        assert_eq!(Provider::Google.disconnect_path(), "/gdisconnect");
    }

    #[test]
    fn test_user_summary_omits_email_and_picture() {
        let user = User {
            id: "U_ABC123".to_string(),
            name: "Alice".to_string(),
            email: "alice@example.com".to_string(),
            picture: Some("https://img/a.png".to_string()),
            created_at: None,
        };

        let value = serde_json::to_value(UserSummary::from(&user)).expect("json");
        let object = value.as_object().expect("object");

        assert_eq!(object.len(), 2);
        assert_eq!(object.get("id").and_then(|v| v.as_str()), Some("U_ABC123"));
        assert_eq!(object.get("name").and_then(|v| v.as_str()), Some("Alice"));
        assert!(!object.contains_key("email"));
        assert!(!object.contains_key("picture"));
    }
}
