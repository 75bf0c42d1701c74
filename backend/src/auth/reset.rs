//! Password-reset flow orchestration.
//!
//! The three-step request/verify/complete sequence guarding password change
//! without an existing session. No token is carried between steps; each step
//! re-authenticates by the (email, code) pair, so step two may be retried
//! freely and the whole flow is resumable. All durable state lives in the
//! [`OtpLedger`].

use std::sync::Arc;

use sqlx::SqlitePool;

use super::errors::AuthError;
use super::otp::OtpLedger;
use super::service;
use crate::database::models::User;
use crate::database::queries;
use crate::services::mailer::ResetMailer;

pub struct IssuedReset {
    pub email: String,
    /// Raw code, for the caller to include in the response only when the
    /// development expose flag is set.
    pub code: String,
}

#[derive(Clone)]
pub struct ResetFlow {
    pool: SqlitePool,
    ledger: OtpLedger,
    mailer: Arc<dyn ResetMailer>,
    otp_expiry_secs: i64,
}

impl ResetFlow {
    pub fn new(
        pool: SqlitePool,
        ledger: OtpLedger,
        mailer: Arc<dyn ResetMailer>,
        otp_expiry_secs: i64,
    ) -> Self {
        ResetFlow {
            pool,
            ledger,
            mailer,
            otp_expiry_secs,
        }
    }

    /// Step one. Resolving an unknown email is a 404: the product chose a
    /// clear "no such account" message over hiding account existence, and
    /// that tradeoff is preserved here rather than silently fixed.
    pub async fn request(&self, email: &str) -> Result<IssuedReset, AuthError> {
        let user = queries::find_user_by_email(&self.pool, email)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        let issued = self.ledger.issue(user.id).await?;

        // Fire-and-forget: delivery failure must not fail the request.
        let greeting = greeting_name(&user);
        if let Err(err) = self
            .mailer
            .send_reset_code(&user.email, &greeting, &issued.code, self.otp_expiry_secs)
            .await
        {
            tracing::warn!(error = %err, "reset-code dispatch failed; continuing");
        }

        Ok(IssuedReset {
            email: user.email,
            code: issued.code,
        })
    }

    /// Step two. Read-only; callers may repeat it until the code is consumed
    /// or expires.
    pub async fn verify(&self, email: &str, code: &str) -> Result<(), AuthError> {
        let user = self.resolve(email).await?;
        self.ledger.verify(user.id, code).await
    }

    /// Step three. Consumes the code, then replaces the password hash. The
    /// code is marked used only on this path, exactly once.
    pub async fn complete(&self, email: &str, code: &str, password: &str) -> Result<(), AuthError> {
        service::validate_password(password)?;
        let user = self.resolve(email).await?;
        self.ledger.consume(user.id, code).await?;

        let password_hash = service::hash_password(password)?;
        queries::update_user_password(&self.pool, user.id, &password_hash).await?;
        tracing::info!(user_id = user.id, "password reset completed");
        Ok(())
    }

    /// Steps two and three report an unknown email as the 400-class
    /// `InvalidEmail`, unlike step one's 404.
    async fn resolve(&self, email: &str) -> Result<User, AuthError> {
        queries::find_user_by_email(&self.pool, email)
            .await?
            .ok_or(AuthError::InvalidEmail)
    }
}

fn greeting_name(user: &User) -> String {
    if user.first_name.is_empty() {
        user.username.clone()
    } else {
        user.first_name.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::database::test_pool;
    use crate::auth::models::RegisterRequest;
    use crate::auth::service::AuthService;
    use crate::services::mailer::{FailingMailer, LogMailer};

    const EMAIL: &str = "lena@example.edu";
    const OLD_PASSWORD: &str = "old password 1";
    const NEW_PASSWORD: &str = "new password 2";

    async fn setup(mailer: Arc<dyn ResetMailer>) -> (AuthService, ResetFlow) {
        let pool = test_pool().await;
        let service = AuthService::new(pool.clone(), Arc::new(Config::default()));
        service
            .register(RegisterRequest {
                email: Some(EMAIL.into()),
                password: Some(OLD_PASSWORD.into()),
                username: Some("lena".into()),
                first_name: None,
                last_name: None,
                role: None,
                university_id: None,
            })
            .await
            .expect("register test user");
        let ledger = OtpLedger::new(pool.clone(), 600);
        let flow = ResetFlow::new(pool, ledger, mailer, 600);
        (service, flow)
    }

    #[tokio::test]
    async fn unknown_email_is_not_found_on_request_but_invalid_on_verify() {
        let (_, flow) = setup(Arc::new(LogMailer)).await;
        assert!(matches!(
            flow.request("ghost@example.edu").await,
            Err(AuthError::UserNotFound)
        ));
        assert!(matches!(
            flow.verify("ghost@example.edu", "123456").await,
            Err(AuthError::InvalidEmail)
        ));
    }

    #[tokio::test]
    async fn full_round_trip_rotates_the_password() {
        let (service, flow) = setup(Arc::new(LogMailer)).await;

        let issued = flow.request(EMAIL).await.unwrap();
        flow.verify(EMAIL, &issued.code).await.unwrap();
        flow.verify(EMAIL, &issued.code).await.unwrap();
        flow.complete(EMAIL, &issued.code, NEW_PASSWORD).await.unwrap();

        // Code is spent: completing again fails.
        assert!(matches!(
            flow.complete(EMAIL, &issued.code, NEW_PASSWORD).await,
            Err(AuthError::CodeNotFound)
        ));

        service.login(EMAIL, NEW_PASSWORD).await.unwrap();
        assert!(matches!(
            service.login(EMAIL, OLD_PASSWORD).await,
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn a_new_request_supersedes_the_old_code() {
        let (_, flow) = setup(Arc::new(LogMailer)).await;
        let first = flow.request(EMAIL).await.unwrap();
        let second = flow.request(EMAIL).await.unwrap();

        assert!(matches!(
            flow.verify(EMAIL, &first.code).await,
            Err(AuthError::CodeNotFound)
        ));
        flow.verify(EMAIL, &second.code).await.unwrap();
    }

    #[tokio::test]
    async fn dispatch_failure_is_non_fatal() {
        let (_, flow) = setup(Arc::new(FailingMailer)).await;
        let issued = flow.request(EMAIL).await.unwrap();
        flow.verify(EMAIL, &issued.code).await.unwrap();
    }

    #[tokio::test]
    async fn weak_replacement_password_is_rejected_before_consuming() {
        let (_, flow) = setup(Arc::new(LogMailer)).await;
        let issued = flow.request(EMAIL).await.unwrap();
        assert!(matches!(
            flow.complete(EMAIL, &issued.code, "short").await,
            Err(AuthError::Validation(_))
        ));
        // The code survived the rejected attempt.
        flow.verify(EMAIL, &issued.code).await.unwrap();
    }
}
