use axum::{
    http::header,
    response::{IntoResponse, Response},
};
use emp_shared::access::Role;
use emp_shared::auth::BearerToken;
use emp_shared::models::{EventSummary, Identity};
use emp_shared::visibility::is_visible_to;
use log::warn;

use crate::error::{AppError, Result};
use crate::state::AppState;

pub mod access_handlers;
pub mod attendance_handlers;
pub mod budget_handlers;
pub mod event_handlers;
pub mod guest_handlers;

/// Fetches an event and hides it unless the caller's role may see it
pub(crate) async fn visible_event(
    state: &AppState,
    id: i64,
    identity: &Identity,
    role: &Role,
    token: &BearerToken,
) -> Result<EventSummary> {
    let event = state.events.get_event(id, Some(&token.0)).await?;

    if !is_visible_to(&event, role, identity) {
        warn!(
            "{} ({}) asked for event {} outside their scope",
            identity.email,
            role.as_str(),
            id
        );
        return Err(AppError::not_found("The requested event was not found".into()));
    }

    Ok(event)
}

/// Header values must be visible ASCII
fn safe_filename(filename: &str) -> String {
    filename
        .chars()
        .map(|c| if c.is_ascii_graphic() || c == ' ' { c } else { '_' })
        .map(|c| if c == '"' || c == '\\' { '_' } else { c })
        .collect()
}

pub(crate) fn csv_download(filename: &str, body: String) -> Response {
    (
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", safe_filename(filename)),
            ),
        ],
        body,
    )
        .into_response()
}
