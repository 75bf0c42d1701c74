//! Handler functions for the notification API.
//!
//! Notifications are strictly per-user: the queries are keyed on the caller's
//! id, so there is no cross-user visibility to gate.

use axum::extract::{Path, State};
use axum::Json;

use crate::auth::middleware::AuthUser;
use crate::database::models::Notification;
use crate::database::queries;
use crate::errors::ApiError;
use crate::state::AppState;

pub async fn list_notifications(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Vec<Notification>>, ApiError> {
    let notifications = queries::list_notifications(&state.pool, user.id).await?;
    Ok(Json(notifications))
}

pub async fn mark_read(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<Notification>, ApiError> {
    let notification = queries::mark_notification_read(&state.pool, user.id, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Notification not found".into()))?;
    Ok(Json(notification))
}
