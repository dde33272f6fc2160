use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Response,
    Extension, Json,
};
use emp_shared::auth::BearerToken;
use emp_shared::models::Identity;
use emp_shared::session::{AttendanceSession, ScanError};
use log::{info, warn};
use uuid::Uuid;

use crate::error::Result;
use crate::handlers::{csv_download, visible_event};
use crate::models::{ProgressResponse, ScanRequest};
use crate::state::{AppState, AttendanceVisit};

fn session_json(id: &Uuid, session: &AttendanceSession) -> serde_json::Value {
    serde_json::json!({
        "sessionId": id,
        "eventId": session.event_id(),
        "eventName": session.event_name(),
        "records": session.ledger().records(),
        "progress": ProgressResponse::from(session.progress())
    })
}

// POST /events/:id/attendance
pub async fn open_session(
    State(state): State<AppState>,
    Path(event_id): Path<i64>,
    Extension(identity): Extension<Identity>,
    Extension(token): Extension<BearerToken>,
) -> Result<(StatusCode, Json<serde_json::Value>)> {
    let role = state.resolve_role(&identity).await;
    let event = visible_event(&state, event_id, &identity, &role, &token).await?;

    let id = Uuid::new_v4();
    let session = AttendanceSession::open(&event);
    let body = session_json(&id, &session);

    let mut sessions = state.sessions.lock().await;
    state.evict_idle(&mut sessions);
    sessions.insert(id, AttendanceVisit::new(identity.email.clone(), session));
    drop(sessions);

    info!(
        "{} opened attendance session {} for event {}",
        identity.email, id, event_id
    );

    Ok((StatusCode::CREATED, Json(body)))
}

// GET /attendance/:session_id
pub async fn get_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<serde_json::Value>> {
    let mut sessions = state.sessions.lock().await;
    let visit = state.touch_visit(&mut sessions, &session_id, &identity)?;

    Ok(Json(session_json(&session_id, &visit.session)))
}

// POST /attendance/:session_id/scan
pub async fn scan(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Extension(identity): Extension<Identity>,
    Json(payload): Json<ScanRequest>,
) -> Result<Json<serde_json::Value>> {
    let identifier = {
        let mut sessions = state.sessions.lock().await;
        let visit = state.touch_visit(&mut sessions, &session_id, &identity)?;
        visit.session.begin_scan(&payload.barcode)?
    };

    // No lock is held while the backend confirms the scan
    let confirmed = state.gateway.check_in(&identifier).await?;

    let mut sessions = state.sessions.lock().await;
    let visit = match sessions.get_mut(&session_id) {
        Some(visit) => visit,
        None => {
            warn!(
                "Session {} closed while {} was being checked in; discarding result",
                session_id, identifier
            );
            return Err(ScanError::SessionClosed.into());
        }
    };

    visit.last_seen = chrono::Utc::now();
    let record = visit.session.complete_scan(confirmed)?;

    Ok(Json(serde_json::json!({
        "message": format!("{} marked as present.", record.display_name),
        "record": record,
        "progress": ProgressResponse::from(visit.session.progress())
    })))
}

// GET /attendance/:session_id/export
pub async fn export_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Extension(identity): Extension<Identity>,
) -> Result<Response> {
    let mut sessions = state.sessions.lock().await;
    let visit = state.touch_visit(&mut sessions, &session_id, &identity)?;

    info!(
        "{} exported {} attendance records for event {}",
        identity.email,
        visit.session.ledger().len(),
        visit.session.event_id()
    );

    Ok(csv_download(
        &visit.session.export_filename(),
        visit.session.export_csv(),
    ))
}

// DELETE /attendance/:session_id
pub async fn close_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Extension(identity): Extension<Identity>,
) -> Result<StatusCode> {
    let mut sessions = state.sessions.lock().await;
    state.touch_visit(&mut sessions, &session_id, &identity)?;
    sessions.remove(&session_id);

    info!("{} closed attendance session {}", identity.email, session_id);
    Ok(StatusCode::NO_CONTENT)
}
