//! Core business logic for the authentication system.
//!
//! This service handles account creation, password hashing, token issuance
//! and validation, and refresh-token revocation. It orchestrates interactions
//! between handlers and the database.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use sqlx::SqlitePool;
use std::sync::Arc;
use uuid::Uuid;

use super::errors::AuthError;
use super::models::{Claims, LoginResponse, RegisterRequest, TokenKind, UserSummary};
use crate::config::Config;
use crate::database::models::{Role, User};
use crate::database::queries::{self, NewUser};
use crate::utils;

const MIN_PASSWORD_LEN: usize = 8;

pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

pub fn verify_password(password: &str, hash: &str) -> Result<bool, AuthError> {
    let parsed = PasswordHash::new(hash)?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(err) => Err(err.into()),
    }
}

pub fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.len() < MIN_PASSWORD_LEN {
        return Err(AuthError::Validation(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

#[derive(Clone)]
pub struct AuthService {
    pool: SqlitePool,
    config: Arc<Config>,
}

impl AuthService {
    pub fn new(pool: SqlitePool, config: Arc<Config>) -> Self {
        AuthService { pool, config }
    }

    pub async fn register(&self, req: RegisterRequest) -> Result<UserSummary, AuthError> {
        let email = req
            .email
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| AuthError::Validation("Email and password are required".into()))?;
        let password = req
            .password
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| AuthError::Validation("Email and password are required".into()))?;
        validate_password(password)?;

        let username = utils::username_or_email(req.username.as_deref(), email);

        // Pre-checks give the friendly message; the UNIQUE constraints below
        // remain the actual guarantee under concurrent registration.
        if queries::find_user_by_username(&self.pool, &username)
            .await?
            .is_some()
        {
            return Err(AuthError::DuplicateUsername);
        }
        if queries::find_user_by_email(&self.pool, email).await?.is_some() {
            return Err(AuthError::DuplicateEmail);
        }

        let password_hash = hash_password(password)?;
        let user = queries::insert_user(
            &self.pool,
            NewUser {
                username: &username,
                email,
                password_hash: &password_hash,
                first_name: req.first_name.as_deref().unwrap_or(""),
                last_name: req.last_name.as_deref().unwrap_or(""),
                role: req.role.unwrap_or_default(),
                university_id: req.university_id.as_deref().filter(|s| !s.is_empty()),
            },
        )
        .await
        .map_err(map_unique_violation)?;

        tracing::info!(user_id = user.id, "registered new account");
        Ok(UserSummary::from(&user))
    }

    /// Identifier resolution is email-first, falling back to treating the
    /// input as a username. Every failure is the same `InvalidCredentials`.
    pub async fn login(&self, identifier: &str, password: &str) -> Result<LoginResponse, AuthError> {
        let user = match queries::find_user_by_email(&self.pool, identifier).await? {
            Some(user) => Some(user),
            None => queries::find_user_by_username(&self.pool, identifier).await?,
        }
        .ok_or(AuthError::InvalidCredentials)?;

        if !verify_password(password, &user.password_hash)? {
            return Err(AuthError::InvalidCredentials);
        }

        let access_token = self.mint_token(&user, TokenKind::Access)?;
        let refresh_token = self.mint_token(&user, TokenKind::Refresh)?;
        tracing::info!(user_id = user.id, "login succeeded");

        Ok(LoginResponse {
            user: UserSummary::from(&user),
            access_token,
            refresh_token,
        })
    }

    /// Exchanges a valid, unrevoked refresh token for a new access token.
    pub async fn refresh(&self, refresh_token: &str) -> Result<String, AuthError> {
        let claims = self
            .decode_token(refresh_token)
            .map_err(|_| AuthError::InvalidToken)?;
        if claims.kind != TokenKind::Refresh {
            return Err(AuthError::InvalidToken);
        }
        if queries::is_token_revoked(&self.pool, &claims.jti).await? {
            return Err(AuthError::InvalidToken);
        }
        let user = queries::find_user_by_id(&self.pool, claims.sub)
            .await?
            .ok_or(AuthError::InvalidToken)?;
        self.mint_token(&user, TokenKind::Access)
    }

    /// Best-effort: a well-formed refresh token gets its `jti` blacklisted;
    /// a missing token is a no-op success; garbage is the caller's 400.
    pub async fn logout(&self, refresh_token: Option<&str>) -> Result<(), AuthError> {
        let Some(token) = refresh_token.filter(|t| !t.is_empty()) else {
            return Ok(());
        };
        let claims = self
            .decode_token(token)
            .map_err(|_| AuthError::MalformedToken)?;
        let expires_at = Utc::now() + Duration::seconds(self.config.refresh_ttl_secs);
        queries::revoke_token(&self.pool, &claims.jti, expires_at).await?;
        tracing::info!(user_id = claims.sub, "refresh token revoked");
        Ok(())
    }

    pub fn mint_token(&self, user: &User, kind: TokenKind) -> Result<String, AuthError> {
        let now = Utc::now();
        let ttl = match kind {
            TokenKind::Access => self.config.access_ttl_secs,
            TokenKind::Refresh => self.config.refresh_ttl_secs,
        };
        let claims = Claims {
            sub: user.id,
            email: user.email.clone(),
            role: user.role,
            kind,
            jti: Uuid::new_v4().to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::seconds(ttl)).timestamp(),
        };
        Ok(encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.config.jwt_secret.as_bytes()),
        )?)
    }

    pub fn decode_token(&self, token: &str) -> Result<Claims, AuthError> {
        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.config.jwt_secret.as_bytes()),
            &Validation::default(),
        )?;
        Ok(data.claims)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

/// Translates a UNIQUE-constraint violation into the matching duplicate
/// error so racing registrations surface the same way as the pre-check.
fn map_unique_violation(err: sqlx::Error) -> AuthError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            let msg = db_err.message();
            if msg.contains("users.email") {
                return AuthError::DuplicateEmail;
            }
            return AuthError::DuplicateUsername;
        }
    }
    AuthError::Database(err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::test_pool;

    fn service(pool: SqlitePool) -> AuthService {
        AuthService::new(pool, Arc::new(Config::default()))
    }

    fn register_request(email: &str) -> RegisterRequest {
        RegisterRequest {
            email: Some(email.into()),
            password: Some("correct horse battery".into()),
            username: None,
            first_name: Some("Josh".into()),
            last_name: Some("Mensah".into()),
            role: None,
            university_id: None,
        }
    }

    #[tokio::test]
    async fn register_defaults_username_to_email() {
        let svc = service(test_pool().await);
        let user = svc.register(register_request("josh@example.edu")).await.unwrap();
        assert_eq!(user.username, "josh@example.edu");
        assert_eq!(user.role, Role::Student);
        assert_eq!(user.full_name, "Josh Mensah");
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let svc = service(test_pool().await);
        svc.register(register_request("dup@example.edu")).await.unwrap();
        let mut second = register_request("dup@example.edu");
        second.username = Some("someone-else".into());
        assert!(matches!(
            svc.register(second).await,
            Err(AuthError::DuplicateEmail)
        ));
    }

    #[tokio::test]
    async fn unique_violation_maps_to_duplicate() {
        let pool = test_pool().await;
        let svc = service(pool.clone());
        svc.register(register_request("store@example.edu")).await.unwrap();

        // Bypass the app-level pre-check to hit the store constraint itself.
        let err = queries::insert_user(
            &pool,
            NewUser {
                username: "another",
                email: "store@example.edu",
                password_hash: "x",
                first_name: "",
                last_name: "",
                role: Role::Student,
                university_id: None,
            },
        )
        .await
        .map_err(map_unique_violation)
        .unwrap_err();
        assert!(matches!(err, AuthError::DuplicateEmail));
    }

    #[tokio::test]
    async fn login_by_email_and_by_username() {
        let svc = service(test_pool().await);
        let mut req = register_request("kofi@example.edu");
        req.username = Some("kofi".into());
        svc.register(req).await.unwrap();

        svc.login("kofi@example.edu", "correct horse battery").await.unwrap();
        svc.login("kofi", "correct horse battery").await.unwrap();
        assert!(matches!(
            svc.login("kofi", "wrong password!").await,
            Err(AuthError::InvalidCredentials)
        ));
        assert!(matches!(
            svc.login("nobody@example.edu", "whatever pass").await,
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn refresh_rotates_access_and_logout_revokes() {
        let svc = service(test_pool().await);
        svc.register(register_request("ama@example.edu")).await.unwrap();
        let session = svc.login("ama@example.edu", "correct horse battery").await.unwrap();

        // Refresh works before logout.
        let access = svc.refresh(&session.refresh_token).await.unwrap();
        let claims = svc.decode_token(&access).unwrap();
        assert_eq!(claims.kind, TokenKind::Access);

        // An access token is not accepted as a refresh token.
        assert!(matches!(
            svc.refresh(&session.access_token).await,
            Err(AuthError::InvalidToken)
        ));

        svc.logout(Some(&session.refresh_token)).await.unwrap();
        assert!(matches!(
            svc.refresh(&session.refresh_token).await,
            Err(AuthError::InvalidToken)
        ));
    }

    #[tokio::test]
    async fn logout_is_best_effort() {
        let svc = service(test_pool().await);
        svc.logout(None).await.unwrap();
        assert!(matches!(
            svc.logout(Some("not-a-jwt")).await,
            Err(AuthError::MalformedToken)
        ));
    }
}
