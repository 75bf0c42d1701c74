//! Defines the HTTP routes for the user API.

use axum::routing::get;
use axum::Router;

use super::handlers;
use crate::state::AppState;

pub fn user_router() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_users))
        .route("/me", get(handlers::me))
}
