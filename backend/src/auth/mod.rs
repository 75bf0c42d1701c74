//! Authentication module for managing user accounts, sessions, and access control.
//!
//! This module provides the public interface for user authentication-related
//! functionalities: login, registration, token management, the password-reset
//! code ledger and flow, and the authorization extractors.

pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod otp;
pub mod reset;
pub mod routes;
pub mod service;

// Re-exports for convenience
pub use middleware::{AdminUser, AuthUser};
pub use otp::OtpLedger;
pub use reset::ResetFlow;
pub use routes::auth_router;
pub use service::AuthService;
