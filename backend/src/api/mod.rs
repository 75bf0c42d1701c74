//! Central module for organizing the application's main API endpoints.
//!
//! This module acts as a top-level container for the ticket, notification,
//! user, and chat-log API domains, excluding core authentication routes
//! which are handled separately.

pub mod chat;
pub mod notification;
pub mod ticket;
pub mod user;

use axum::Router;

use crate::state::AppState;

pub fn api_router() -> Router<AppState> {
    Router::new()
        .nest("/tickets", ticket::routes::ticket_router())
        .nest("/notifications", notification::routes::notification_router())
        .nest("/users", user::routes::user_router())
        .nest("/chat", chat::routes::chat_router())
}
