//! Database query functions (Data Access Objects).
//!
//! This module centralizes all direct database operations, providing reusable
//! functions for interacting with the database and abstracting the query logic
//! from higher-level services and API handlers. Functions that must run inside
//! a caller-controlled transaction take `&mut SqliteConnection`.

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};

use super::models::{
    ChatLog, Notification, PasswordResetCode, Role, Ticket, TicketCategory, TicketStatus, Urgency,
    User,
};

// -- users --------------------------------------------------------------

pub struct NewUser<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub role: Role,
    pub university_id: Option<&'a str>,
}

pub async fn insert_user(pool: &SqlitePool, new: NewUser<'_>) -> Result<User, sqlx::Error> {
    sqlx::query_as::<_, User>(
        "INSERT INTO users (username, email, password_hash, first_name, last_name, role, university_id, created_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?)
         RETURNING *",
    )
    .bind(new.username)
    .bind(new.email)
    .bind(new.password_hash)
    .bind(new.first_name)
    .bind(new.last_name)
    .bind(new.role)
    .bind(new.university_id)
    .bind(Utc::now())
    .fetch_one(pool)
    .await
}

pub async fn find_user_by_email(
    pool: &SqlitePool,
    email: &str,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = ?")
        .bind(email)
        .fetch_optional(pool)
        .await
}

pub async fn find_user_by_username(
    pool: &SqlitePool,
    username: &str,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = ?")
        .bind(username)
        .fetch_optional(pool)
        .await
}

pub async fn find_user_by_id(pool: &SqlitePool, id: i64) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn list_users(pool: &SqlitePool) -> Result<Vec<User>, sqlx::Error> {
    sqlx::query_as::<_, User>("SELECT * FROM users ORDER BY id")
        .fetch_all(pool)
        .await
}

pub async fn update_user_password(
    pool: &SqlitePool,
    user_id: i64,
    password_hash: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE users SET password_hash = ? WHERE id = ?")
        .bind(password_hash)
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(())
}

// -- password reset codes -----------------------------------------------

/// Marks every outstanding unused code for `user_id` as used. Run inside the
/// same transaction as the insert of the replacement code.
pub async fn invalidate_reset_codes(
    conn: &mut SqliteConnection,
    user_id: i64,
) -> Result<u64, sqlx::Error> {
    let res = sqlx::query("UPDATE password_reset_codes SET is_used = 1 WHERE user_id = ? AND is_used = 0")
        .bind(user_id)
        .execute(conn)
        .await?;
    Ok(res.rows_affected())
}

pub async fn insert_reset_code(
    conn: &mut SqliteConnection,
    user_id: i64,
    code: &str,
) -> Result<PasswordResetCode, sqlx::Error> {
    sqlx::query_as::<_, PasswordResetCode>(
        "INSERT INTO password_reset_codes (user_id, code, created_at, is_used)
         VALUES (?, ?, ?, 0)
         RETURNING *",
    )
    .bind(user_id)
    .bind(code)
    .bind(Utc::now())
    .fetch_one(conn)
    .await
}

/// The active-code lookup: exact code match, unused only. Expired rows are
/// still returned; expiry is the caller's read-time check.
pub async fn find_unused_reset_code(
    conn: &mut SqliteConnection,
    user_id: i64,
    code: &str,
) -> Result<Option<PasswordResetCode>, sqlx::Error> {
    sqlx::query_as::<_, PasswordResetCode>(
        "SELECT * FROM password_reset_codes WHERE user_id = ? AND code = ? AND is_used = 0",
    )
    .bind(user_id)
    .bind(code)
    .fetch_optional(conn)
    .await
}

pub async fn mark_reset_code_used(
    conn: &mut SqliteConnection,
    id: i64,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE password_reset_codes SET is_used = 1 WHERE id = ?")
        .bind(id)
        .execute(conn)
        .await?;
    Ok(())
}

#[cfg(test)]
pub async fn count_unused_reset_codes(pool: &SqlitePool, user_id: i64) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM password_reset_codes WHERE user_id = ? AND is_used = 0")
        .bind(user_id)
        .fetch_one(pool)
        .await
        .expect("count reset codes")
}

/// Test hook: shift a code's creation time to simulate the passage of time.
#[cfg(test)]
pub async fn backdate_reset_code(pool: &SqlitePool, id: i64, created_at: DateTime<Utc>) {
    sqlx::query("UPDATE password_reset_codes SET created_at = ? WHERE id = ?")
        .bind(created_at)
        .bind(id)
        .execute(pool)
        .await
        .expect("backdate reset code");
}

// -- revoked refresh tokens ---------------------------------------------

pub async fn revoke_token(
    pool: &SqlitePool,
    jti: &str,
    expires_at: DateTime<Utc>,
) -> Result<(), sqlx::Error> {
    // Idempotent: revoking twice is not an error.
    sqlx::query("INSERT OR IGNORE INTO revoked_tokens (jti, expires_at) VALUES (?, ?)")
        .bind(jti)
        .bind(expires_at)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn is_token_revoked(pool: &SqlitePool, jti: &str) -> Result<bool, sqlx::Error> {
    let n: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM revoked_tokens WHERE jti = ?")
        .bind(jti)
        .fetch_one(pool)
        .await?;
    Ok(n > 0)
}

// -- tickets -------------------------------------------------------------

pub struct NewTicket<'a> {
    pub reporter_id: i64,
    pub description: &'a str,
    pub location: &'a str,
    pub category: TicketCategory,
    pub urgency: Urgency,
    pub photo: Option<&'a str>,
}

pub async fn insert_ticket(pool: &SqlitePool, new: NewTicket<'_>) -> Result<Ticket, sqlx::Error> {
    let now = Utc::now();
    sqlx::query_as::<_, Ticket>(
        "INSERT INTO tickets (reporter_id, description, location, category, urgency, status, photo, created_at, updated_at)
         VALUES (?, ?, ?, ?, ?, 'open', ?, ?, ?)
         RETURNING *",
    )
    .bind(new.reporter_id)
    .bind(new.description)
    .bind(new.location)
    .bind(new.category)
    .bind(new.urgency)
    .bind(new.photo)
    .bind(now)
    .bind(now)
    .fetch_one(pool)
    .await
}

/// Role-scoped listing: admins see every ticket, everyone else sees rows
/// they reported or are assigned to.
pub async fn list_tickets_for(
    pool: &SqlitePool,
    user_id: i64,
    role: Role,
) -> Result<Vec<Ticket>, sqlx::Error> {
    if role.is_admin() {
        sqlx::query_as::<_, Ticket>("SELECT * FROM tickets ORDER BY created_at DESC")
            .fetch_all(pool)
            .await
    } else {
        sqlx::query_as::<_, Ticket>(
            "SELECT * FROM tickets WHERE reporter_id = ? OR assigned_to = ? ORDER BY created_at DESC",
        )
        .bind(user_id)
        .bind(user_id)
        .fetch_all(pool)
        .await
    }
}

/// Role-scoped detail fetch: triage roles reach any row, others only their
/// own. Out-of-scope rows read as absent rather than forbidden.
pub async fn find_ticket_for(
    pool: &SqlitePool,
    ticket_id: i64,
    user_id: i64,
    role: Role,
) -> Result<Option<Ticket>, sqlx::Error> {
    if role.can_triage() {
        sqlx::query_as::<_, Ticket>("SELECT * FROM tickets WHERE id = ?")
            .bind(ticket_id)
            .fetch_optional(pool)
            .await
    } else {
        sqlx::query_as::<_, Ticket>(
            "SELECT * FROM tickets WHERE id = ? AND (reporter_id = ? OR assigned_to = ?)",
        )
        .bind(ticket_id)
        .bind(user_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await
    }
}

pub struct TicketUpdate<'a> {
    pub description: &'a str,
    pub location: &'a str,
    pub category: TicketCategory,
    pub urgency: Urgency,
    pub status: TicketStatus,
    pub photo: Option<&'a str>,
    pub assigned_to: Option<i64>,
}

pub async fn update_ticket(
    pool: &SqlitePool,
    ticket_id: i64,
    update: TicketUpdate<'_>,
) -> Result<Ticket, sqlx::Error> {
    sqlx::query_as::<_, Ticket>(
        "UPDATE tickets
         SET description = ?, location = ?, category = ?, urgency = ?, status = ?, photo = ?, assigned_to = ?, updated_at = ?
         WHERE id = ?
         RETURNING *",
    )
    .bind(update.description)
    .bind(update.location)
    .bind(update.category)
    .bind(update.urgency)
    .bind(update.status)
    .bind(update.photo)
    .bind(update.assigned_to)
    .bind(Utc::now())
    .bind(ticket_id)
    .fetch_one(pool)
    .await
}

pub async fn delete_ticket(pool: &SqlitePool, ticket_id: i64) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM tickets WHERE id = ?")
        .bind(ticket_id)
        .execute(pool)
        .await?;
    Ok(())
}

// -- notifications -------------------------------------------------------

pub async fn insert_notification(
    pool: &SqlitePool,
    user_id: i64,
    ticket_id: i64,
    message: &str,
) -> Result<Notification, sqlx::Error> {
    sqlx::query_as::<_, Notification>(
        "INSERT INTO notifications (user_id, ticket_id, message, is_read, created_at)
         VALUES (?, ?, ?, 0, ?)
         RETURNING *",
    )
    .bind(user_id)
    .bind(ticket_id)
    .bind(message)
    .bind(Utc::now())
    .fetch_one(pool)
    .await
}

pub async fn list_notifications(
    pool: &SqlitePool,
    user_id: i64,
) -> Result<Vec<Notification>, sqlx::Error> {
    sqlx::query_as::<_, Notification>(
        "SELECT * FROM notifications WHERE user_id = ? ORDER BY created_at DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
}

pub async fn mark_notification_read(
    pool: &SqlitePool,
    user_id: i64,
    notification_id: i64,
) -> Result<Option<Notification>, sqlx::Error> {
    sqlx::query_as::<_, Notification>(
        "UPDATE notifications SET is_read = 1 WHERE id = ? AND user_id = ? RETURNING *",
    )
    .bind(notification_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await
}

// -- chat logs -----------------------------------------------------------

pub async fn insert_chat_log(
    pool: &SqlitePool,
    user_id: i64,
    message: &str,
    response: &str,
    ticket_id: Option<i64>,
) -> Result<ChatLog, sqlx::Error> {
    sqlx::query_as::<_, ChatLog>(
        "INSERT INTO chat_logs (user_id, message, response, ticket_id, created_at)
         VALUES (?, ?, ?, ?, ?)
         RETURNING *",
    )
    .bind(user_id)
    .bind(message)
    .bind(response)
    .bind(ticket_id)
    .bind(Utc::now())
    .fetch_one(pool)
    .await
}

pub async fn list_chat_logs(pool: &SqlitePool, user_id: i64) -> Result<Vec<ChatLog>, sqlx::Error> {
    sqlx::query_as::<_, ChatLog>(
        "SELECT * FROM chat_logs WHERE user_id = ? ORDER BY created_at DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
}
