//! Handler functions for authentication-related API endpoints.
//!
//! These functions process incoming HTTP requests for registration, login,
//! token management, and the three-step password-reset flow, parse request
//! data, and delegate to `auth::service` and `auth::reset` for the business
//! logic.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

use super::models::{
    ForgotPasswordRequest, ForgotPasswordResponse, LoginRequest, LoginResponse, MessageResponse,
    RefreshResponse, RegisterRequest, RegisterResponse, ResetPasswordRequest, TokenRequest,
    VerifyResetCodeRequest, VerifyResetCodeResponse,
};
use crate::errors::ApiError;
use crate::state::AppState;

fn required<'a>(field: Option<&'a String>, message: &str) -> Result<&'a str, ApiError> {
    field
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::Validation(message.into()))
}

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiError> {
    let user = state.auth.register(req).await?;
    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "User created successfully".into(),
            user,
        }),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let email = required(req.email.as_ref(), "Email and password are required")?;
    let password = required(req.password.as_ref(), "Email and password are required")?;
    Ok(Json(state.auth.login(email, password).await?))
}

pub async fn logout(
    State(state): State<AppState>,
    Json(req): Json<TokenRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.auth.logout(req.refresh_token.as_deref()).await?;
    Ok(Json(MessageResponse {
        message: "Successfully logged out".into(),
    }))
}

pub async fn refresh(
    State(state): State<AppState>,
    Json(req): Json<TokenRequest>,
) -> Result<Json<RefreshResponse>, ApiError> {
    let token = required(req.refresh_token.as_ref(), "Refresh token required")?;
    let access_token = state.auth.refresh(token).await?;
    Ok(Json(RefreshResponse { access_token }))
}

pub async fn forgot_password(
    State(state): State<AppState>,
    Json(req): Json<ForgotPasswordRequest>,
) -> Result<Json<ForgotPasswordResponse>, ApiError> {
    let email = required(req.email.as_ref(), "Email is required")?;
    let issued = state.reset.request(email).await?;
    // The raw code leaves the API only under the development flag.
    let code = state.config.expose_reset_code.then_some(issued.code);
    Ok(Json(ForgotPasswordResponse {
        message: "Reset code sent to your email".into(),
        email: issued.email,
        code,
    }))
}

pub async fn verify_reset_code(
    State(state): State<AppState>,
    Json(req): Json<VerifyResetCodeRequest>,
) -> Result<Json<VerifyResetCodeResponse>, ApiError> {
    let email = required(req.email.as_ref(), "Email and code are required")?;
    let code = required(req.code.as_ref(), "Email and code are required")?;
    state.reset.verify(email, code).await?;
    Ok(Json(VerifyResetCodeResponse {
        message: "Code verified successfully".into(),
        email: email.into(),
        code: code.into(),
    }))
}

pub async fn reset_password(
    State(state): State<AppState>,
    Json(req): Json<ResetPasswordRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let email = required(req.email.as_ref(), "Email, code, and new password are required")?;
    let code = required(req.code.as_ref(), "Email, code, and new password are required")?;
    let password = req
        .password
        .as_deref()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::Validation("Email, code, and new password are required".into()))?;
    state.reset.complete(email, code, password).await?;
    Ok(Json(MessageResponse {
        message: "Password reset successfully".into(),
    }))
}
