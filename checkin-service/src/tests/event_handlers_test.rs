use axum::http::{header, StatusCode};
use serde_json::json;
use tower::ServiceExt;

use super::{
    create_test_app, create_test_app_with_events, event, CIVIL_ADMIN, PRIVILEGED, STUDENT,
    ULTIMATE_ADMIN,
};
use emp_shared::auth::AuthMode;
use emp_shared::api::EventSource;
use emp_shared::auth::{build_request, create_test_request, create_test_token};
use emp_shared::models::EventStatus;
use emp_shared::test_utils::http_test_utils::{response_to_json, response_to_text};

fn event_ids(body: &serde_json::Value) -> Vec<i64> {
    body["events"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["id"].as_i64().unwrap())
        .collect()
}

#[tokio::test]
async fn test_ultimate_admin_sees_every_event() {
    let test = create_test_app();

    let response = test
        .app
        .oneshot(create_test_request("GET", "/events", ULTIMATE_ADMIN, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response_to_json(response).await;
    assert_eq!(event_ids(&body), vec![1, 2, 3]);
    assert_eq!(body["count"], 3);
}

#[tokio::test]
async fn test_department_admin_only_sees_their_department() {
    let test = create_test_app();

    let response = test
        .app
        .oneshot(create_test_request("GET", "/events", CIVIL_ADMIN, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response_to_json(response).await;
    assert_eq!(event_ids(&body), vec![1]);
}

#[tokio::test]
async fn test_user_only_sees_events_they_host() {
    let test = create_test_app();
    let token = create_test_token(STUDENT, Some("Jane"), Some("Doe"));

    let response = test
        .app
        .oneshot(build_request("GET", "/events", Some(&token), None))
        .await
        .unwrap();

    let body = response_to_json(response).await;
    assert_eq!(event_ids(&body), vec![3]);
}

#[tokio::test]
async fn test_filters_combine_with_role_scope() {
    let test = create_test_app();

    let response = test
        .app
        .clone()
        .oneshot(create_test_request(
            "GET",
            "/events?status=approved&search=ROBOT",
            PRIVILEGED,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(event_ids(&response_to_json(response).await), vec![2]);

    let response = test
        .app
        .oneshot(create_test_request(
            "GET",
            "/events?status=all&department=Mechanical%20Engineering",
            PRIVILEGED,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(event_ids(&response_to_json(response).await), vec![2]);
}

#[tokio::test]
async fn test_unknown_status_filter_is_rejected() {
    let test = create_test_app();

    let response = test
        .app
        .oneshot(create_test_request(
            "GET",
            "/events?status=cancelled",
            ULTIMATE_ADMIN,
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_missing_token_is_unauthorized() {
    let test = create_test_app();

    let response = test
        .app
        .oneshot(build_request("GET", "/events", None, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = response_to_json(response).await;
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_list_departments() {
    let test = create_test_app();

    let response = test
        .app
        .oneshot(create_test_request(
            "GET",
            "/events/departments",
            ULTIMATE_ADMIN,
            None,
        ))
        .await
        .unwrap();

    let body = response_to_json(response).await;
    assert_eq!(
        body["departments"],
        json!([
            "Department of Civil Engineering",
            "Mechanical Engineering",
            "Humanities & Social Sciences"
        ])
    );
}

#[tokio::test]
async fn test_export_events_as_csv() {
    let test = create_test_app();

    let response = test
        .app
        .oneshot(create_test_request(
            "GET",
            "/events/export",
            CIVIL_ADMIN,
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers()[header::CONTENT_TYPE]
        .to_str()
        .unwrap()
        .starts_with("text/csv"));
    let disposition = response.headers()[header::CONTENT_DISPOSITION]
        .to_str()
        .unwrap()
        .to_string();
    assert!(disposition.starts_with("attachment; filename=\"filtered_events_"));

    let csv = response_to_text(response).await;
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[1].starts_with("Bridge Design Contest,Omar Khalid,"));
}

#[tokio::test]
async fn test_export_single_event() {
    let test = create_test_app();

    let response = test
        .app
        .oneshot(create_test_request(
            "GET",
            "/events/2/export",
            PRIVILEGED,
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"robotics_expo_2.csv\""
    );
    let csv = response_to_text(response).await;
    assert_eq!(csv.lines().count(), 2);
}

#[tokio::test]
async fn test_get_event_reports_expected_attendees() {
    let test = create_test_app();

    let response = test
        .app
        .oneshot(create_test_request("GET", "/events/2", ULTIMATE_ADMIN, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response_to_json(response).await;
    assert_eq!(body["event"]["name"], "Robotics Expo");
    assert_eq!(body["expectedAttendees"], 48);
}

#[tokio::test]
async fn test_expected_attendees_saturate_instead_of_overflowing() {
    let mut huge = event(9, "Campus Marathon", "Omar Khalid", "Management", "Approved");
    huge.expected_students = Some(u32::MAX);
    huge.expected_faculty = Some(1);
    let test = create_test_app_with_events(vec![huge], AuthMode::TrustUpstream);

    let response = test
        .app
        .clone()
        .oneshot(create_test_request("GET", "/events/9", ULTIMATE_ADMIN, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_to_json(response).await;
    assert_eq!(body["expectedAttendees"], u32::MAX);

    let response = test
        .app
        .oneshot(create_test_request(
            "POST",
            "/events/9/attendance",
            ULTIMATE_ADMIN,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = response_to_json(response).await;
    assert_eq!(body["progress"]["expected"], u32::MAX);
}

#[tokio::test]
async fn test_event_outside_scope_is_not_found() {
    let test = create_test_app();

    let response = test
        .app
        .clone()
        .oneshot(create_test_request("GET", "/events/2", CIVIL_ADMIN, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = test
        .app
        .oneshot(create_test_request("GET", "/events/99", ULTIMATE_ADMIN, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_department_admin_approves_event() {
    let test = create_test_app();

    let response = test
        .app
        .oneshot(create_test_request(
            "PATCH",
            "/events/1/status",
            CIVIL_ADMIN,
            Some(json!({ "status": "approved" })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response_to_json(response).await;
    assert_eq!(body["message"], "Event approved successfully");
    assert_eq!(body["event"]["status"], "Approved");

    let stored = test.events.get_event(1, None).await.unwrap();
    assert_eq!(stored.status, EventStatus::Approved);
}

#[tokio::test]
async fn test_unchanged_status_is_reported() {
    let test = create_test_app();

    let response = test
        .app
        .oneshot(create_test_request(
            "PATCH",
            "/events/2/status",
            ULTIMATE_ADMIN,
            Some(json!({ "status": "Approved" })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response_to_json(response).await;
    assert_eq!(body["message"], "Event already approved");
}

#[tokio::test]
async fn test_user_cannot_review_events() {
    let test = create_test_app();
    let token = create_test_token(STUDENT, Some("Jane"), Some("Doe"));

    let response = test
        .app
        .oneshot(build_request(
            "PATCH",
            "/events/3/status",
            Some(&token),
            Some(json!({ "status": "denied" })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_department_admin_cannot_review_other_departments() {
    let test = create_test_app();

    let response = test
        .app
        .oneshot(create_test_request(
            "PATCH",
            "/events/2/status",
            CIVIL_ADMIN,
            Some(json!({ "status": "denied" })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
