use axum::{extract::State, Extension, Json};
use emp_shared::access::Role;
use emp_shared::models::Identity;
use log::info;

use crate::error::{AppError, Result};
use crate::state::AppState;

// GET /me
pub async fn whoami(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<serde_json::Value>> {
    let role = state.resolve_role(&identity).await;
    let treasurer = state.is_treasurer(&identity).await;

    Ok(Json(serde_json::json!({
        "email": identity.email,
        "firstName": identity.first_name,
        "lastName": identity.last_name,
        "role": role.as_str(),
        "department": role.department(),
        "canReview": role.can_review(),
        "treasurer": treasurer
    })))
}

// POST /access/reload
pub async fn reload_access(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<serde_json::Value>> {
    if state.resolve_role(&identity).await != Role::UltimateAdmin {
        return Err(AppError::forbidden(
            "Only ultimate admins can reload access tables".into(),
        ));
    }

    let access = state.reload_access().await?;
    info!("{} reloaded the access tables", identity.email);

    Ok(Json(serde_json::json!({
        "message": "Access tables reloaded",
        "ultimateAdmins": access.ultimate_admins.len(),
        "departmentAdmins": access.department_admins.len(),
        "privilegedUsers": access.privileged_users.len(),
        "treasurers": access.treasurers.len()
    })))
}
