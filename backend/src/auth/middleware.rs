//! Middleware for protecting authenticated routes and handling authorization.
//!
//! [`AuthUser`] is an extractor: any handler that takes it only runs with a
//! valid bearer access token, and receives the caller's identity and role
//! loaded fresh from the database. [`AdminUser`] additionally requires the
//! admin role.

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use super::models::TokenKind;
use crate::database::models::Role;
use crate::database::queries;
use crate::errors::ApiError;
use crate::state::AppState;

/// The authenticated caller.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub role: Role,
}

fn unauthorized() -> ApiError {
    ApiError::Unauthorized("Invalid or missing access token".into())
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .ok_or_else(unauthorized)?;

        let claims = state.auth.decode_token(token).map_err(|_| unauthorized())?;
        if claims.kind != TokenKind::Access {
            return Err(unauthorized());
        }

        // Role comes from the row, not the claim, so a role change takes
        // effect without waiting out old tokens.
        let user = queries::find_user_by_id(&state.pool, claims.sub)
            .await?
            .ok_or_else(unauthorized)?;

        Ok(AuthUser {
            id: user.id,
            username: user.username,
            email: user.email,
            role: user.role,
        })
    }
}

/// Extractor that rejects every non-admin caller with 403.
#[derive(Debug, Clone)]
pub struct AdminUser(pub AuthUser);

#[async_trait]
impl FromRequestParts<AppState> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if !user.role.is_admin() {
            return Err(ApiError::Forbidden("Admin access required".into()));
        }
        Ok(AdminUser(user))
    }
}
