//! Rust structs that represent database table mappings.
//!
//! These models define the structure of data as it is stored in and retrieved
//! from the database. Note that these may differ from API-specific models:
//! `User` in particular carries the password hash and is never serialized
//! directly into a response.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Account role. Stored as text, but all gating happens through the
/// exhaustive matches below rather than string comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum Role {
    Student,
    Faculty,
    Staff,
    Admin,
}

impl Role {
    /// Roles allowed to triage tickets (change status, reassign, edit any row).
    pub fn can_triage(self) -> bool {
        match self {
            Role::Admin | Role::Staff => true,
            Role::Student | Role::Faculty => false,
        }
    }

    pub fn is_admin(self) -> bool {
        matches!(self, Role::Admin)
    }
}

impl Default for Role {
    fn default() -> Self {
        Role::Student
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
    pub university_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// One password-reset code. Rows are never deleted; consumed or superseded
/// codes are kept with `is_used = true` as an audit trail.
#[derive(Debug, Clone, FromRow)]
pub struct PasswordResetCode {
    pub id: i64,
    pub user_id: i64,
    pub code: String,
    pub created_at: DateTime<Utc>,
    pub is_used: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum TicketCategory {
    Plumbing,
    Electrical,
    Structural,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum Urgency {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum TicketStatus {
    Open,
    InProgress,
    Resolved,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Ticket {
    pub id: i64,
    pub reporter_id: i64,
    pub description: String,
    pub location: String,
    pub category: TicketCategory,
    pub urgency: Urgency,
    pub status: TicketStatus,
    /// Stored path or URL; upload mechanics live outside this backend.
    pub photo: Option<String>,
    pub assigned_to: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Notification {
    pub id: i64,
    pub user_id: i64,
    pub ticket_id: i64,
    pub message: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ChatLog {
    pub id: i64,
    pub user_id: i64,
    pub message: String,
    pub response: String,
    pub ticket_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}
