use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use emp_shared::auth::BearerToken;
use emp_shared::models::{BudgetStatus, BudgetTally, Identity};
use log::info;

use crate::error::{AppError, Result};
use crate::models::{BudgetQuery, UpdateStatusRequest};
use crate::state::AppState;

async fn require_treasurer(state: &AppState, identity: &Identity) -> Result<()> {
    if state.is_treasurer(identity).await {
        Ok(())
    } else {
        Err(AppError::forbidden(
            "Only treasurers can review budget requests".into(),
        ))
    }
}

// GET /budgets?event=
pub async fn list_budgets(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Extension(token): Extension<BearerToken>,
    Query(query): Query<BudgetQuery>,
) -> Result<Json<serde_json::Value>> {
    require_treasurer(&state, &identity).await?;

    let budgets = state.events.list_budgets(query.event, Some(&token.0)).await?;
    let tally = BudgetTally::of(&budgets);

    Ok(Json(serde_json::json!({
        "count": budgets.len(),
        "pending": tally.pending,
        "granted": tally.granted,
        "denied": tally.denied,
        "budgets": budgets
    })))
}

// PATCH /budgets/:id/status
pub async fn update_budget_status(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Extension(identity): Extension<Identity>,
    Extension(token): Extension<BearerToken>,
    Json(payload): Json<UpdateStatusRequest>,
) -> Result<Json<serde_json::Value>> {
    require_treasurer(&state, &identity).await?;

    let status: BudgetStatus = payload.status.parse()?;
    let budget = state
        .events
        .update_budget_status(id, status, Some(&token.0))
        .await
        .map_err(|e| {
            if e.is_not_found() {
                AppError::not_found("Budget item not found".into())
            } else {
                e.into()
            }
        })?;

    info!("{} set budget item {} to {}", identity.email, id, status);

    Ok(Json(serde_json::json!({
        "message": format!("Budget {} successfully", status.as_str().to_lowercase()),
        "budget": budget
    })))
}
