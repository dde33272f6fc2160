use axum::{
    extract::Request,
    middleware,
    routing::{get, patch, post},
    Router,
};
use log::{info, warn};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::config::{ServiceConfig, StartupError};
use crate::handlers::{
    access_handlers::{reload_access, whoami},
    attendance_handlers::{close_session, export_session, get_session, open_session, scan},
    budget_handlers::{list_budgets, update_budget_status},
    event_handlers::{
        export_event, export_events, get_event, list_departments, list_events, update_event_status,
    },
    guest_handlers::register_guest,
};
use crate::state::AppState;
use emp_shared::access::AccessConfig;
use emp_shared::api::HttpBackendApi;
use emp_shared::gateway::HttpCheckInGateway;

// Import shared auth middleware
use emp_shared::auth::auth_middleware;

/// Creates a router backed by the real events backend
pub fn create_router(config: &ServiceConfig) -> Result<Router, StartupError> {
    info!("Creating router against backend {}", config.api_base_url);

    let events = Arc::new(HttpBackendApi::new(
        &config.api_base_url,
        config.checkin_timeout,
    )?);
    let gateway = Arc::new(HttpCheckInGateway::new(
        &config.api_base_url,
        config.checkin_timeout,
    )?);
    let access = AccessConfig::load(&config.access_config_path)?;

    let state = AppState::new(events, gateway, access, config.auth.clone())
        .with_access_path(config.access_config_path.clone())
        .with_session_idle(config.session_idle);

    info!("Using API route prefix: {}", config.route_prefix);
    Ok(create_router_with_state(state, &config.route_prefix))
}

/// Creates a router over the given state
pub fn create_router_with_state(state: AppState, prefix: &str) -> Router {
    info!("Setting up API routes with prefix: '{}'", prefix);

    // Configure CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Logging middleware to trace all requests
    async fn logging_middleware(
        req: Request,
        next: axum::middleware::Next,
    ) -> impl axum::response::IntoResponse {
        info!(
            "Router received request: method={}, uri={}",
            req.method(),
            req.uri()
        );
        next.run(req).await
    }

    let event_routes = Router::new()
        .route("/me", get(whoami))
        .route("/events", get(list_events))
        .route("/events/departments", get(list_departments))
        .route("/events/export", get(export_events))
        .route("/events/:id", get(get_event))
        .route("/events/:id/export", get(export_event))
        .route("/events/:id/status", patch(update_event_status))
        .route("/events/:id/attendance", post(open_session))
        .route(
            "/attendance/:session_id",
            get(get_session).delete(close_session),
        )
        .route("/attendance/:session_id/scan", post(scan))
        .route("/attendance/:session_id/export", get(export_session))
        .route("/budgets", get(list_budgets))
        .route("/budgets/:id/status", patch(update_budget_status))
        .route("/access/reload", post(reload_access))
        .layer(middleware::from_fn_with_state(
            state.auth.clone(),
            auth_middleware,
        ))
        .with_state(state.clone());

    // Guests register from a public invitation link
    let guest_routes = Router::new()
        .route("/guests/:event_id/register", post(register_guest))
        .with_state(state);

    let api_routes = event_routes.merge(guest_routes);

    let router = if prefix.is_empty() {
        api_routes
            .layer(cors)
            .layer(middleware::from_fn(logging_middleware))
    } else {
        Router::new()
            .nest(prefix, api_routes)
            .layer(cors)
            .layer(middleware::from_fn(logging_middleware))
    };

    info!(
        "Router configured with all routes and middleware under prefix: '{}'",
        prefix
    );

    router.fallback(|req: Request| async move {
        warn!("No route matched for: {} {}", req.method(), req.uri());
        (
            axum::http::StatusCode::NOT_FOUND,
            "The requested resource was not found".to_string(),
        )
    })
}
