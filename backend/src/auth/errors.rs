//! Custom error types specific to authentication failures.
//!
//! This module defines the set of errors that can occur during registration,
//! login, token handling, and the password-reset flow. Message wording is
//! part of the API contract: login failures are deliberately uniform (no
//! distinction between unknown user and wrong password), and reset-code
//! lookup failures collapse into a single externally-visible class.

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Refresh-token validation failure: bad signature, expired, wrong kind,
    /// or revoked. Surfaced as 401.
    #[error("Invalid refresh token")]
    InvalidToken,

    /// A token that does not even parse, handed to logout. Surfaced as 400.
    #[error("Invalid token")]
    MalformedToken,

    #[error("No account found with this email address. Please check your email or create a new account.")]
    UserNotFound,

    #[error("Invalid email")]
    InvalidEmail,

    /// No unused code matches: wrong value, already consumed, or never
    /// issued. Indistinguishable to the caller by design.
    #[error("Invalid or expired code")]
    CodeNotFound,

    #[error("Code has expired")]
    CodeExpired,

    #[error("Email already exists")]
    DuplicateEmail,

    #[error("Username already exists")]
    DuplicateUsername,

    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Database(#[from] sqlx::Error),

    #[error("password hashing failed: {0}")]
    PasswordHash(String),

    #[error(transparent)]
    Token(#[from] jsonwebtoken::errors::Error),
}

impl From<argon2::password_hash::Error> for AuthError {
    fn from(err: argon2::password_hash::Error) -> Self {
        AuthError::PasswordHash(err.to_string())
    }
}
