//! Module for the notification API.
//!
//! Read access to a user's own ticket notifications, plus marking them read.

pub mod handlers;
pub mod routes;
