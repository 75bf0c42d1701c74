//! Defines the HTTP routes for the chat-log API.

use axum::routing::get;
use axum::Router;

use super::handlers;
use crate::state::AppState;

pub fn chat_router() -> Router<AppState> {
    Router::new().route("/", get(handlers::list_chat_logs).post(handlers::create_chat_log))
}
