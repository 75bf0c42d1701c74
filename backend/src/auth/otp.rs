//! One-time password-reset code ledger.
//!
//! Owns the lifecycle of 6-digit reset codes: issuance (which atomically
//! supersedes any outstanding code for the user), non-mutating verification,
//! and one-shot consumption. Codes are never deleted; superseded and consumed
//! rows stay behind with `is_used = true`.

use chrono::{Duration, Utc};
use rand::Rng;
use sqlx::SqlitePool;

use super::errors::AuthError;
use crate::database::models::PasswordResetCode;
use crate::database::queries;

pub const CODE_LEN: usize = 6;

/// Uniform 6-digit numeric code. Leading zeros are valid, so this is a
/// string, not a number.
fn generate_code() -> String {
    let mut rng = rand::thread_rng();
    (0..CODE_LEN)
        .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
        .collect()
}

#[derive(Clone)]
pub struct OtpLedger {
    pool: SqlitePool,
    expiry: Duration,
}

impl OtpLedger {
    pub fn new(pool: SqlitePool, expiry_secs: i64) -> Self {
        OtpLedger {
            pool,
            expiry: Duration::seconds(expiry_secs),
        }
    }

    /// Issues a fresh code for `user_id`, invalidating every outstanding
    /// unused code in the same transaction. Exactly one active code exists
    /// per user after this returns.
    pub async fn issue(&self, user_id: i64) -> Result<PasswordResetCode, AuthError> {
        let mut tx = self.pool.begin().await?;
        let superseded = queries::invalidate_reset_codes(&mut *tx, user_id).await?;
        if superseded > 0 {
            tracing::debug!(user_id, superseded, "superseded outstanding reset codes");
        }
        let code = queries::insert_reset_code(&mut *tx, user_id, &generate_code()).await?;
        tx.commit().await?;
        Ok(code)
    }

    /// Checks that `code` is the user's active code and still inside the
    /// expiry window. Never mutates; safe to repeat until the code is
    /// consumed or expires.
    pub async fn verify(&self, user_id: i64, code: &str) -> Result<(), AuthError> {
        let mut conn = self.pool.acquire().await?;
        let record = queries::find_unused_reset_code(&mut *conn, user_id, code)
            .await?
            .ok_or(AuthError::CodeNotFound)?;
        self.check_expiry(&record)
    }

    /// Same lookup and expiry check as [`verify`](Self::verify), then marks
    /// the code used. The check and the mark share one transaction so two
    /// racing consumers cannot both succeed. This is the only consumption
    /// path, invoked solely by a successful password reset.
    pub async fn consume(&self, user_id: i64, code: &str) -> Result<(), AuthError> {
        let mut tx = self.pool.begin().await?;
        let record = queries::find_unused_reset_code(&mut *tx, user_id, code)
            .await?
            .ok_or(AuthError::CodeNotFound)?;
        self.check_expiry(&record)?;
        queries::mark_reset_code_used(&mut *tx, record.id).await?;
        tx.commit().await?;
        Ok(())
    }

    /// Expiry is computed at read time; expired rows are never swept, merely
    /// treated as invalid on lookup.
    fn check_expiry(&self, record: &PasswordResetCode) -> Result<(), AuthError> {
        if Utc::now() - record.created_at > self.expiry {
            return Err(AuthError::CodeExpired);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::Role;
    use crate::database::queries::{backdate_reset_code, count_unused_reset_codes, NewUser};
    use crate::database::{queries, test_pool};

    async fn seeded_user(pool: &SqlitePool) -> i64 {
        queries::insert_user(
            pool,
            NewUser {
                username: "amara",
                email: "amara@example.edu",
                password_hash: "x",
                first_name: "Amara",
                last_name: "Okafor",
                role: Role::Student,
                university_id: None,
            },
        )
        .await
        .expect("insert user")
        .id
    }

    #[test]
    fn generated_codes_are_six_digits() {
        for _ in 0..100 {
            let code = generate_code();
            assert_eq!(code.len(), CODE_LEN);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[tokio::test]
    async fn issue_supersedes_previous_code() {
        let pool = test_pool().await;
        let user_id = seeded_user(&pool).await;
        let ledger = OtpLedger::new(pool.clone(), 600);

        let first = ledger.issue(user_id).await.unwrap();
        let second = ledger.issue(user_id).await.unwrap();

        assert_eq!(count_unused_reset_codes(&pool, user_id).await, 1);
        assert!(ledger.verify(user_id, &second.code).await.is_ok());
        assert!(matches!(
            ledger.verify(user_id, &first.code).await,
            Err(AuthError::CodeNotFound)
        ));
    }

    #[tokio::test]
    async fn verify_is_repeatable_and_consume_is_one_shot() {
        let pool = test_pool().await;
        let user_id = seeded_user(&pool).await;
        let ledger = OtpLedger::new(pool.clone(), 600);

        let issued = ledger.issue(user_id).await.unwrap();
        ledger.verify(user_id, &issued.code).await.unwrap();
        ledger.verify(user_id, &issued.code).await.unwrap();

        ledger.consume(user_id, &issued.code).await.unwrap();
        assert!(matches!(
            ledger.consume(user_id, &issued.code).await,
            Err(AuthError::CodeNotFound)
        ));
        assert!(matches!(
            ledger.verify(user_id, &issued.code).await,
            Err(AuthError::CodeNotFound)
        ));
    }

    #[tokio::test]
    async fn wrong_code_is_not_found() {
        let pool = test_pool().await;
        let user_id = seeded_user(&pool).await;
        let ledger = OtpLedger::new(pool.clone(), 600);

        let issued = ledger.issue(user_id).await.unwrap();
        let wrong = if issued.code == "000000" { "000001" } else { "000000" };
        assert!(matches!(
            ledger.verify(user_id, wrong).await,
            Err(AuthError::CodeNotFound)
        ));
    }

    #[tokio::test]
    async fn expiry_boundary_is_inclusive() {
        let pool = test_pool().await;
        let user_id = seeded_user(&pool).await;
        let ledger = OtpLedger::new(pool.clone(), 600);

        // 599 seconds old: still valid.
        let issued = ledger.issue(user_id).await.unwrap();
        backdate_reset_code(&pool, issued.id, Utc::now() - Duration::seconds(599)).await;
        ledger.consume(user_id, &issued.code).await.unwrap();

        // 601 seconds old: expired, and still unconsumed afterwards.
        let issued = ledger.issue(user_id).await.unwrap();
        backdate_reset_code(&pool, issued.id, Utc::now() - Duration::seconds(601)).await;
        assert!(matches!(
            ledger.consume(user_id, &issued.code).await,
            Err(AuthError::CodeExpired)
        ));
        assert_eq!(count_unused_reset_codes(&pool, user_id).await, 1);
    }
}
