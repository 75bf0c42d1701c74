//! Handler functions for user profile and management API endpoints.

use axum::extract::State;
use axum::Json;

use crate::auth::middleware::{AdminUser, AuthUser};
use crate::auth::models::UserSummary;
use crate::database::queries;
use crate::errors::ApiError;
use crate::state::AppState;

/// Admin-only listing of every account.
pub async fn list_users(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
) -> Result<Json<Vec<UserSummary>>, ApiError> {
    let users = queries::list_users(&state.pool).await?;
    Ok(Json(users.iter().map(UserSummary::from).collect()))
}

/// The caller's own profile, resolved from the bearer token.
pub async fn me(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<UserSummary>, ApiError> {
    let row = queries::find_user_by_id(&state.pool, user.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;
    Ok(Json(UserSummary::from(&row)))
}
