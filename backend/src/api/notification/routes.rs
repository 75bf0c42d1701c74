//! Defines the HTTP routes for the notification API.

use axum::routing::{get, put};
use axum::Router;

use super::handlers;
use crate::state::AppState;

pub fn notification_router() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_notifications))
        .route("/:id/read", put(handlers::mark_read))
}
