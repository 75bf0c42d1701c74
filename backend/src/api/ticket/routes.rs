//! Defines the HTTP routes for the ticket API.

use axum::routing::get;
use axum::Router;

use super::handlers;
use crate::state::AppState;

pub fn ticket_router() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_tickets).post(handlers::create_ticket))
        .route(
            "/:id",
            get(handlers::get_ticket)
                .put(handlers::update_ticket)
                .delete(handlers::delete_ticket),
        )
}
