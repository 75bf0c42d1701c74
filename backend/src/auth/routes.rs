//! Defines the HTTP routes specifically for authentication.
//!
//! These routes handle user registration, login, token refreshing, and the
//! password-reset flow. They are designed to be nested under `/api/auth` in
//! the main Axum router.

use axum::routing::post;
use axum::Router;

use super::handlers;
use crate::state::AppState;

pub fn auth_router() -> Router<AppState> {
    Router::new()
        .route("/register", post(handlers::register))
        .route("/login", post(handlers::login))
        .route("/logout", post(handlers::logout))
        .route("/refresh", post(handlers::refresh))
        .route("/forgot-password", post(handlers::forgot_password))
        .route("/verify-reset-code", post(handlers::verify_reset_code))
        .route("/reset-password", post(handlers::reset_password))
}
