//! Module for the maintenance-ticket API.
//!
//! This module defines the public interface and structure for filing,
//! listing, triaging, and resolving facility tickets through HTTP endpoints.

pub mod handlers;
pub mod routes;
