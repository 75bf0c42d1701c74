//! Central module for application-wide configuration settings.
//!
//! This module handles loading and managing configuration parameters such as
//! the database URL, server bind address, token signing secret, and the
//! password-reset code expiry window.

use std::env;
use std::net::SocketAddr;

/// Runtime configuration, sourced from the environment (a `.env` file is
/// honoured in development via `dotenvy`).
#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: SocketAddr,
    pub database_url: String,
    pub jwt_secret: String,
    /// Access-token lifetime in seconds.
    pub access_ttl_secs: i64,
    /// Refresh-token lifetime in seconds.
    pub refresh_ttl_secs: i64,
    /// How long an issued password-reset code stays valid, in seconds.
    pub otp_expiry_secs: i64,
    /// Development flag: include the raw reset code in the forgot-password
    /// response body. Must stay off in production; defaults to off.
    pub expose_reset_code: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {source}")]
    Invalid {
        var: &'static str,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

fn parsed<T>(var: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(var) {
        Ok(raw) => raw.parse().map_err(|e| ConfigError::Invalid {
            var,
            source: Box::new(e),
        }),
        Err(_) => Ok(default),
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Config {
            bind_addr: parsed("FIXIT_BIND_ADDR", SocketAddr::from(([127, 0, 0, 1], 8000)))?,
            database_url: env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://fixit.db".into()),
            jwt_secret: env::var("FIXIT_JWT_SECRET")
                .unwrap_or_else(|_| "dev-secret-do-not-use-in-production".into()),
            access_ttl_secs: parsed("ACCESS_TOKEN_TTL_SECS", 900)?,
            refresh_ttl_secs: parsed("REFRESH_TOKEN_TTL_SECS", 14 * 24 * 3600)?,
            otp_expiry_secs: parsed("OTP_EXPIRY_SECS", 600)?,
            expose_reset_code: parsed("FIXIT_EXPOSE_RESET_CODE", false)?,
        })
    }
}

#[cfg(test)]
impl Default for Config {
    fn default() -> Self {
        Config {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
            database_url: "sqlite::memory:".into(),
            jwt_secret: "test-secret".into(),
            access_ttl_secs: 900,
            refresh_ttl_secs: 14 * 24 * 3600,
            otp_expiry_secs: 600,
            expose_reset_code: false,
        }
    }
}
