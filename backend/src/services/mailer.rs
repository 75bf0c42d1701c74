//! Reset-code notification dispatch.
//!
//! The orchestrator treats delivery as fire-and-forget: a failed send is
//! logged and never fails the request. The trait keeps transport out of the
//! core; the default implementation writes the message to the log, which is
//! also what development runs use instead of a real mail relay.

use async_trait::async_trait;

#[derive(Debug, thiserror::Error)]
#[error("failed to dispatch mail to {recipient}: {reason}")]
pub struct MailerError {
    pub recipient: String,
    pub reason: String,
}

/// Outbound notification channel for password-reset codes.
#[async_trait]
pub trait ResetMailer: Send + Sync {
    async fn send_reset_code(
        &self,
        recipient: &str,
        greeting_name: &str,
        code: &str,
        expires_in_secs: i64,
    ) -> Result<(), MailerError>;
}

/// Logs the would-be email instead of sending it.
pub struct LogMailer;

#[async_trait]
impl ResetMailer for LogMailer {
    async fn send_reset_code(
        &self,
        recipient: &str,
        greeting_name: &str,
        code: &str,
        expires_in_secs: i64,
    ) -> Result<(), MailerError> {
        tracing::info!(
            recipient,
            greeting_name,
            code,
            expires_in_mins = expires_in_secs / 60,
            "password reset code issued (mail transport disabled)"
        );
        Ok(())
    }
}

/// Test double that always fails, for exercising the non-fatal path.
#[cfg(test)]
pub struct FailingMailer;

#[cfg(test)]
#[async_trait]
impl ResetMailer for FailingMailer {
    async fn send_reset_code(
        &self,
        recipient: &str,
        _greeting_name: &str,
        _code: &str,
        _expires_in_secs: i64,
    ) -> Result<(), MailerError> {
        Err(MailerError {
            recipient: recipient.into(),
            reason: "transport down".into(),
        })
    }
}
