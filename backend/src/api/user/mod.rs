//! Module for user profile and management API endpoints.
//!
//! This module handles functionalities related to user information that is
//! distinct from the core authentication process: the admin-only account
//! listing and the caller's own profile.

pub mod handlers;
pub mod routes;
