//! Handler functions for the maintenance-ticket API.
//!
//! Visibility is role-scoped: admins see every ticket, everyone else only
//! rows they reported or are assigned to. Triage fields (status, assignee)
//! are writable by admin and staff only. Status and assignee changes fan out
//! notifications to the affected users.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use crate::auth::middleware::AuthUser;
use crate::database::models::{Ticket, TicketCategory, TicketStatus, Urgency};
use crate::database::queries::{self, NewTicket, TicketUpdate};
use crate::errors::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateTicketRequest {
    pub description: Option<String>,
    pub location: Option<String>,
    #[serde(default)]
    pub category: Option<TicketCategory>,
    #[serde(default)]
    pub urgency: Option<Urgency>,
    #[serde(default)]
    pub photo: Option<String>,
}

/// Partial update; absent fields keep their current value.
#[derive(Debug, Deserialize)]
pub struct UpdateTicketRequest {
    pub description: Option<String>,
    pub location: Option<String>,
    pub category: Option<TicketCategory>,
    pub urgency: Option<Urgency>,
    pub status: Option<TicketStatus>,
    pub photo: Option<String>,
    pub assigned_to: Option<i64>,
}

pub async fn list_tickets(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Vec<Ticket>>, ApiError> {
    let tickets = queries::list_tickets_for(&state.pool, user.id, user.role).await?;
    Ok(Json(tickets))
}

pub async fn create_ticket(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<CreateTicketRequest>,
) -> Result<(StatusCode, Json<Ticket>), ApiError> {
    let description = req
        .description
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::Validation("Description and location are required".into()))?;
    let location = req
        .location
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::Validation("Description and location are required".into()))?;

    let ticket = queries::insert_ticket(
        &state.pool,
        NewTicket {
            reporter_id: user.id,
            description,
            location,
            category: req.category.unwrap_or(TicketCategory::Other),
            urgency: req.urgency.unwrap_or(Urgency::Low),
            photo: req.photo.as_deref(),
        },
    )
    .await?;
    tracing::info!(ticket_id = ticket.id, reporter_id = user.id, "ticket filed");
    Ok((StatusCode::CREATED, Json(ticket)))
}

pub async fn get_ticket(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<Ticket>, ApiError> {
    let ticket = queries::find_ticket_for(&state.pool, id, user.id, user.role)
        .await?
        .ok_or_else(|| ApiError::NotFound("Ticket not found".into()))?;
    Ok(Json(ticket))
}

pub async fn update_ticket(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
    Json(req): Json<UpdateTicketRequest>,
) -> Result<Json<Ticket>, ApiError> {
    let current = queries::find_ticket_for(&state.pool, id, user.id, user.role)
        .await?
        .ok_or_else(|| ApiError::NotFound("Ticket not found".into()))?;

    let touches_triage = req.status.is_some() || req.assigned_to.is_some();
    if touches_triage && !user.role.can_triage() {
        return Err(ApiError::Forbidden(
            "Only staff or admin can change status or assignment".into(),
        ));
    }

    let status = req.status.unwrap_or(current.status);
    let assigned_to = req.assigned_to.or(current.assigned_to);

    let updated = queries::update_ticket(
        &state.pool,
        id,
        TicketUpdate {
            description: req.description.as_deref().unwrap_or(&current.description),
            location: req.location.as_deref().unwrap_or(&current.location),
            category: req.category.unwrap_or(current.category),
            urgency: req.urgency.unwrap_or(current.urgency),
            status,
            photo: req.photo.as_deref().or(current.photo.as_deref()),
            assigned_to,
        },
    )
    .await?;

    notify_changes(&state, &current, &updated).await;
    Ok(Json(updated))
}

pub async fn delete_ticket(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    queries::find_ticket_for(&state.pool, id, user.id, user.role)
        .await?
        .ok_or_else(|| ApiError::NotFound("Ticket not found".into()))?;
    queries::delete_ticket(&state.pool, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Notification fan-out is best-effort; a failed insert is logged, not
/// surfaced.
async fn notify_changes(state: &AppState, before: &Ticket, after: &Ticket) {
    if before.status != after.status {
        let message = format!(
            "Your ticket at {} is now {}",
            after.location,
            status_label(after.status)
        );
        if let Err(err) =
            queries::insert_notification(&state.pool, after.reporter_id, after.id, &message).await
        {
            tracing::warn!(error = %err, ticket_id = after.id, "status notification failed");
        }
    }
    if before.assigned_to != after.assigned_to {
        if let Some(assignee) = after.assigned_to {
            let message = format!("You have been assigned a ticket at {}", after.location);
            if let Err(err) =
                queries::insert_notification(&state.pool, assignee, after.id, &message).await
            {
                tracing::warn!(error = %err, ticket_id = after.id, "assignment notification failed");
            }
        }
    }
}

fn status_label(status: TicketStatus) -> &'static str {
    match status {
        TicketStatus::Open => "open",
        TicketStatus::InProgress => "in progress",
        TicketStatus::Resolved => "resolved",
    }
}
