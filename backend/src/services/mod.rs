//! Module for core business logic services.
//!
//! This module encapsulates services that perform specific business
//! operations outside the request/response plumbing, such as dispatching
//! password-reset notifications.

pub mod mailer;
