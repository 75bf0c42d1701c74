//! Module for the chat-log API.
//!
//! Stores and returns a user's assistant-chat transcript, optionally linked
//! to a ticket.

pub mod handlers;
pub mod routes;
