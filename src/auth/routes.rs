//! Authentication routes

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers;

/// Creates and returns the authentication router
///
/// # Routes
/// - `GET /login` - Render login page with a fresh state token
/// - `POST /gconnect` - Exchange a Google authorization code for a session
/// - `GET /gdisconnect` - Revoke the Google token and clear the session
/// - `GET /disconnect` - Provider-dispatching disconnect
/// - `GET /users.json` - Public user projections
/// - `GET /user/:username/:email` - User detail view
pub fn auth_routes() -> Router {
    Router::new()
        .route("/login", get(handlers::show_login))
        .route("/gconnect", post(handlers::gconnect))
        .route("/gdisconnect", get(handlers::gdisconnect))
        .route("/disconnect", get(handlers::disconnect))
        .route("/users.json", get(handlers::users_json))
        .route("/user/:username/:email", get(handlers::show_user))
}
