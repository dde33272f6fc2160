use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use emp_shared::registration::GuestRegistration;
use log::info;

use crate::error::Result;
use crate::models::GuestRegistrationRequest;
use crate::state::AppState;

// POST /guests/:event_id/register
pub async fn register_guest(
    State(state): State<AppState>,
    Path(event_id): Path<i64>,
    Json(payload): Json<GuestRegistrationRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>)> {
    let registration = GuestRegistration::from(payload);
    registration.validate()?;

    let pass = state.events.register_guest(event_id, &registration).await?;
    info!(
        "Registered guest {} for event {}",
        registration.email, event_id
    );

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "message": "Registration successful",
            "barcode": pass.barcode
        })),
    ))
}
