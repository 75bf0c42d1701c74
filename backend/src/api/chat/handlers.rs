//! Handler functions for the chat-log API.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use crate::auth::middleware::AuthUser;
use crate::database::models::ChatLog;
use crate::database::queries;
use crate::errors::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateChatLogRequest {
    pub message: Option<String>,
    pub response: Option<String>,
    #[serde(default)]
    pub ticket_id: Option<i64>,
}

pub async fn list_chat_logs(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Vec<ChatLog>>, ApiError> {
    let logs = queries::list_chat_logs(&state.pool, user.id).await?;
    Ok(Json(logs))
}

pub async fn create_chat_log(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<CreateChatLogRequest>,
) -> Result<(StatusCode, Json<ChatLog>), ApiError> {
    let message = req
        .message
        .as_deref()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::Validation("Message and response are required".into()))?;
    let response = req
        .response
        .as_deref()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::Validation("Message and response are required".into()))?;

    let log =
        queries::insert_chat_log(&state.pool, user.id, message, response, req.ticket_id).await?;
    Ok((StatusCode::CREATED, Json(log)))
}
