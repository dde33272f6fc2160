mod event_handlers_test;

use std::sync::Arc;

use axum::Router;
use emp_shared::access::AccessConfig;
use emp_shared::auth::AuthMode;
use emp_shared::models::{Budget, EventSummary};
use emp_shared::test_utils::mock_event_source::MockEventSource;
use emp_shared::test_utils::mock_gateway::MockCheckInGateway;
use emp_shared::test_utils::test_logging::init_test_logging;
use serde_json::json;

use crate::routes::create_router_with_state;
use crate::state::AppState;

pub const ULTIMATE_ADMIN: &str = "dean@aurak.ac.ae";
pub const CIVIL_ADMIN: &str = "civil.head@aurak.ac.ae";
pub const PRIVILEGED: &str = "events.office@aurak.ac.ae";
pub const STUDENT: &str = "jane.doe@aurak.ac.ae";
pub const TREASURER: &str = "finance@aurak.ac.ae";

pub struct TestApp {
    pub app: Router,
    pub state: AppState,
    pub events: Arc<MockEventSource>,
    pub gateway: Arc<MockCheckInGateway>,
}

pub fn test_access() -> AccessConfig {
    AccessConfig::from_json_str(
        &json!({
            "ultimateAdmins": [ULTIMATE_ADMIN],
            "departmentAdmins": { CIVIL_ADMIN: "Civil Engineering" },
            "privilegedUsers": [PRIVILEGED],
            "treasurers": [TREASURER]
        })
        .to_string(),
    )
    .unwrap()
}

pub fn event(id: i64, name: &str, host: &str, department: &str, status: &str) -> EventSummary {
    serde_json::from_value(json!({
        "id": id,
        "name": name,
        "host": host,
        "department": department,
        "status": status,
        "start_date": "2026-11-03",
        "venue": "Main Hall",
        "expected_students": 40,
        "expected_faculty": 8
    }))
    .unwrap()
}

pub fn sample_events() -> Vec<EventSummary> {
    vec![
        event(1, "Bridge Design Contest", "Omar Khalid", "Department of Civil Engineering", "Pending"),
        event(2, "Robotics Expo", "Sara Ali", "Mechanical Engineering", "Approved"),
        event(3, "Cultural Night", "Jane Doe", "Humanities & Social Sciences", "Approved"),
    ]
}

fn budget(id: i64, event: i64, item: &str, total: &str, status: &str) -> Budget {
    serde_json::from_value(json!({
        "id": id,
        "event": event,
        "item_name": item,
        "item_quantity": 1,
        "item_cost": total,
        "total_cost": total,
        "budget_status": status
    }))
    .unwrap()
}

pub fn sample_budgets() -> Vec<Budget> {
    vec![
        budget(11, 1, "Steel beams", "900.00", "Pending"),
        budget(12, 2, "Servo kits", "2400.00", "Granted"),
        budget(13, 3, "Stage lighting", "1250.50", "Pending"),
    ]
}

pub fn create_test_app() -> TestApp {
    create_test_app_with_auth(AuthMode::TrustUpstream)
}

pub fn create_test_app_with_auth(auth: AuthMode) -> TestApp {
    create_test_app_with_events(sample_events(), auth)
}

pub fn create_test_app_with_events(events: Vec<EventSummary>, auth: AuthMode) -> TestApp {
    init_test_logging();

    let events = Arc::new(MockEventSource::new(events).with_budgets(sample_budgets()));
    let gateway = Arc::new(MockCheckInGateway::new());
    let state = AppState::new(events.clone(), gateway.clone(), test_access(), auth);
    let app = create_router_with_state(state.clone(), "");

    TestApp {
        app,
        state,
        events,
        gateway,
    }
}
