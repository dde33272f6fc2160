use axum::{
    extract::{Path, Query, State},
    response::Response,
    Extension, Json,
};
use chrono::Utc;
use emp_shared::auth::BearerToken;
use emp_shared::export::{event_filename, events_to_csv, filtered_events_filename};
use emp_shared::models::{EventStatus, Identity};
use emp_shared::visibility::{distinct_departments, filter_events, FilterCriteria};
use log::info;

use crate::error::{AppError, Result};
use crate::handlers::{csv_download, visible_event};
use crate::models::{EventQuery, UpdateStatusRequest};
use crate::state::AppState;

// GET /events
pub async fn list_events(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Extension(token): Extension<BearerToken>,
    Query(query): Query<EventQuery>,
) -> Result<Json<serde_json::Value>> {
    let criteria = query.into_criteria()?;
    let role = state.resolve_role(&identity).await;

    let events = state.events.list_events(Some(&token.0)).await?;
    let visible = filter_events(&events, &role, &identity, &criteria);

    info!(
        "{} ({}) sees {} of {} events",
        identity.email,
        role.as_str(),
        visible.len(),
        events.len()
    );

    Ok(Json(serde_json::json!({
        "events": visible,
        "count": visible.len()
    })))
}

// GET /events/departments
pub async fn list_departments(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Extension(token): Extension<BearerToken>,
) -> Result<Json<serde_json::Value>> {
    let role = state.resolve_role(&identity).await;
    let events = state.events.list_events(Some(&token.0)).await?;
    let visible = filter_events(&events, &role, &identity, &FilterCriteria::default());

    Ok(Json(serde_json::json!({
        "departments": distinct_departments(&visible)
    })))
}

// GET /events/export
pub async fn export_events(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Extension(token): Extension<BearerToken>,
    Query(query): Query<EventQuery>,
) -> Result<Response> {
    let criteria = query.into_criteria()?;
    let role = state.resolve_role(&identity).await;

    let events = state.events.list_events(Some(&token.0)).await?;
    let visible = filter_events(&events, &role, &identity, &criteria);

    info!("{} exported {} events", identity.email, visible.len());

    Ok(csv_download(
        &filtered_events_filename(Utc::now().date_naive()),
        events_to_csv(&visible),
    ))
}

// GET /events/:id
pub async fn get_event(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Extension(identity): Extension<Identity>,
    Extension(token): Extension<BearerToken>,
) -> Result<Json<serde_json::Value>> {
    let role = state.resolve_role(&identity).await;
    let event = visible_event(&state, id, &identity, &role, &token).await?;
    let expected_attendees = event.expected_attendance().total();

    Ok(Json(serde_json::json!({
        "event": event,
        "expectedAttendees": expected_attendees
    })))
}

// GET /events/:id/export
pub async fn export_event(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Extension(identity): Extension<Identity>,
    Extension(token): Extension<BearerToken>,
) -> Result<Response> {
    let role = state.resolve_role(&identity).await;
    let event = visible_event(&state, id, &identity, &role, &token).await?;

    Ok(csv_download(
        &event_filename(&event),
        events_to_csv(std::slice::from_ref(&event)),
    ))
}

// PATCH /events/:id/status
pub async fn update_event_status(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Extension(identity): Extension<Identity>,
    Extension(token): Extension<BearerToken>,
    Json(payload): Json<UpdateStatusRequest>,
) -> Result<Json<serde_json::Value>> {
    let role = state.resolve_role(&identity).await;
    if !role.can_review() {
        return Err(AppError::forbidden(
            "You don't have permission to review events".into(),
        ));
    }

    let status: EventStatus = payload.status.parse()?;
    let event = visible_event(&state, id, &identity, &role, &token).await?;

    if event.status == status {
        return Ok(Json(serde_json::json!({
            "message": format!("Event already {}", status.as_str().to_lowercase()),
            "event": event
        })));
    }

    let updated = state
        .events
        .update_status(id, status, Some(&token.0))
        .await?;

    info!(
        "{} ({}) set event {} to {}",
        identity.email,
        role.as_str(),
        id,
        status
    );

    Ok(Json(serde_json::json!({
        "message": format!("Event {} successfully", status.as_str().to_lowercase()),
        "event": updated
    })))
}
