use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::{Mutex, Notify};

use crate::gateway::{parse_check_in_response, CheckInError, CheckInGateway};
use crate::models::AttendanceRecord;

/// Scripted check-in endpoint. Unscripted identifiers are rejected as unknown.
#[derive(Default)]
pub struct MockCheckInGateway {
    replies: Mutex<HashMap<String, Result<AttendanceRecord, CheckInError>>>,
    calls: Mutex<Vec<String>>,
    hold: Mutex<Option<(Arc<Notify>, Arc<Notify>)>>,
}

impl MockCheckInGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scripts a successful reply built the same way the real endpoint's body is read
    pub async fn confirm(&self, identifier: &str, role: &str, name: &str) {
        let body = serde_json::json!({
            "status": "success",
            "attendee": {
                "role": role,
                "name": name,
                "checkin_time": Utc::now().to_rfc3339(),
            }
        })
        .to_string();

        self.replies.lock().await.insert(
            identifier.to_string(),
            parse_check_in_response(identifier, 200, &body),
        );
    }

    pub async fn fail(&self, identifier: &str, error: CheckInError) {
        self.replies
            .lock()
            .await
            .insert(identifier.to_string(), Err(error));
    }

    /// Makes the next calls wait for `release` after signalling `entered`
    pub async fn hold(&self) -> (Arc<Notify>, Arc<Notify>) {
        let entered = Arc::new(Notify::new());
        let release = Arc::new(Notify::new());
        *self.hold.lock().await = Some((entered.clone(), release.clone()));
        (entered, release)
    }

    pub async fn calls(&self) -> Vec<String> {
        self.calls.lock().await.clone()
    }
}

#[async_trait]
impl CheckInGateway for MockCheckInGateway {
    async fn check_in(&self, identifier: &str) -> Result<AttendanceRecord, CheckInError> {
        self.calls.lock().await.push(identifier.to_string());

        let hold = self.hold.lock().await.clone();
        if let Some((entered, release)) = hold {
            entered.notify_one();
            release.notified().await;
        }

        self.replies
            .lock()
            .await
            .get(identifier)
            .cloned()
            .unwrap_or_else(|| Err(CheckInError::RejectedByServer("HTTP status 404".to_string())))
    }
}
