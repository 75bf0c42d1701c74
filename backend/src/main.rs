//! Main entry point for the FixIT backend.
//!
//! This file initializes the Axum web server, sets up the database
//! connection, and registers all API routes.
//! It orchestrates the application's startup and defines its overall structure.

mod api;
mod auth;
mod config;
mod database;
mod errors;
mod services;
mod state;
mod utils;

use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::services::mailer::LogMailer;
use crate::state::AppState;

fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .nest("/api/auth", auth::auth_router())
        .nest("/api", api::api_router())
        .with_state(state)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = Config::from_env()?;
    if config.expose_reset_code {
        tracing::warn!("FIXIT_EXPOSE_RESET_CODE is on; reset codes will appear in API responses");
    }

    let pool = database::connect(&config.database_url).await?;
    let addr = config.bind_addr;
    let state = AppState::new(pool, config, Arc::new(LogMailer));

    let listener = TcpListener::bind(addr).await?;
    tracing::info!("listening on {}", addr);
    axum::serve(listener, app(state)).await?;
    Ok(())
}

async fn root_handler() -> &'static str {
    "Welcome to FixIT!"
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    async fn test_app(expose_reset_code: bool) -> Router {
        let pool = database::test_pool().await;
        let config = Config {
            expose_reset_code,
            ..Config::default()
        };
        app(AppState::new(pool, config, Arc::new(LogMailer)))
    }

    async fn post(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
        let response = app
            .clone()
            .oneshot(
                Request::post(uri)
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .expect("build request"),
            )
            .await
            .expect("run request");
        let status = response.status();
        let bytes = response.into_body().collect().await.expect("read body").to_bytes();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    #[tokio::test]
    async fn reset_flow_end_to_end_over_http() {
        let app = test_app(true).await;

        let (status, _) = post(
            &app,
            "/api/auth/register",
            json!({"email": "nia@example.edu", "password": "first password", "first_name": "Nia"}),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, body) = post(
            &app,
            "/api/auth/forgot-password",
            json!({"email": "nia@example.edu"}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let code = body["code"].as_str().expect("dev flag exposes code").to_string();
        assert_eq!(code.len(), 6);

        let (status, _) = post(
            &app,
            "/api/auth/verify-reset-code",
            json!({"email": "nia@example.edu", "code": code}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = post(
            &app,
            "/api/auth/reset-password",
            json!({"email": "nia@example.edu", "code": code, "password": "second password"}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        // Old password rejected, new one accepted.
        let (status, body) = post(
            &app,
            "/api/auth/login",
            json!({"email": "nia@example.edu", "password": "first password"}),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Invalid credentials");

        let (status, body) = post(
            &app,
            "/api/auth/login",
            json!({"email": "nia@example.edu", "password": "second password"}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["accessToken"].is_string());

        // Logout, then the refresh token is dead.
        let refresh_token = body["refreshToken"].as_str().expect("refresh token").to_string();
        let (status, _) = post(&app, "/api/auth/logout", json!({"refreshToken": refresh_token})).await;
        assert_eq!(status, StatusCode::OK);
        let (status, body) = post(&app, "/api/auth/refresh", json!({"refreshToken": refresh_token})).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Invalid refresh token");
    }

    #[tokio::test]
    async fn forgot_password_hides_code_by_default() {
        let app = test_app(false).await;
        post(
            &app,
            "/api/auth/register",
            json!({"email": "tunde@example.edu", "password": "some password"}),
        )
        .await;

        let (status, body) = post(
            &app,
            "/api/auth/forgot-password",
            json!({"email": "tunde@example.edu"}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.get("code").is_none());

        // Unknown email reveals account absence: a deliberate product choice.
        let (status, _) = post(
            &app,
            "/api/auth/forgot-password",
            json!({"email": "ghost@example.edu"}),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn ticket_visibility_is_role_scoped() {
        let app = test_app(false).await;

        for (email, role) in [
            ("student@example.edu", "student"),
            ("admin@example.edu", "admin"),
        ] {
            let (status, _) = post(
                &app,
                "/api/auth/register",
                json!({"email": email, "password": "some password", "role": role}),
            )
            .await;
            assert_eq!(status, StatusCode::CREATED);
        }

        let login = |email: &str| {
            let app = app.clone();
            let email = email.to_string();
            async move {
                let (_, body) = post(
                    &app,
                    "/api/auth/login",
                    json!({"email": email, "password": "some password"}),
                )
                .await;
                body["accessToken"].as_str().expect("token").to_string()
            }
        };
        let student_token = login("student@example.edu").await;
        let admin_token = login("admin@example.edu").await;

        let response = app
            .clone()
            .oneshot(
                Request::post("/api/tickets/")
                    .header(header::CONTENT_TYPE, "application/json")
                    .header(header::AUTHORIZATION, format!("Bearer {student_token}"))
                    .body(Body::from(
                        json!({"description": "Leaking tap", "location": "Block C", "category": "plumbing"})
                            .to_string(),
                    ))
                    .expect("build request"),
            )
            .await
            .expect("run request");
        assert_eq!(response.status(), StatusCode::CREATED);

        // The student cannot list users; the admin can and sees both tickets' reporters.
        let get_with = |uri: &'static str, token: String| {
            let app = app.clone();
            async move {
                app.oneshot(
                    Request::get(uri)
                        .header(header::AUTHORIZATION, format!("Bearer {token}"))
                        .body(Body::empty())
                        .expect("build request"),
                )
                .await
                .expect("run request")
                .status()
            }
        };
        assert_eq!(
            get_with("/api/users/", student_token.clone()).await,
            StatusCode::FORBIDDEN
        );
        assert_eq!(get_with("/api/users/", admin_token).await, StatusCode::OK);
        assert_eq!(
            get_with("/api/tickets/", student_token).await,
            StatusCode::OK
        );
    }
}
