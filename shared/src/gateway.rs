use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use log::{error, info, warn};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::AttendanceRecord;

const CHECKIN_PATH: &str = "attendance/checkin/";

/// Why a scan could not be confirmed. The identifier is never recorded.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CheckInError {
    #[error("Unexpected check-in response: {0}")]
    MalformedResponse(String),

    #[error("Check-in rejected: {0}")]
    RejectedByServer(String),

    #[error("Check-in request failed: {0}")]
    NetworkFailure(String),
}

#[async_trait]
pub trait CheckInGateway: Send + Sync {
    /// Confirms a scanned identifier with the backend
    async fn check_in(&self, identifier: &str) -> Result<AttendanceRecord, CheckInError>;
}

#[derive(Debug, Serialize)]
struct CheckInRequest<'a> {
    barcode: &'a str,
}

#[derive(Debug, Deserialize)]
struct CheckInResponse {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    attendee: Option<CheckInAttendee>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    detail: Option<String>,
}

impl CheckInResponse {
    fn reason(&self) -> Option<String> {
        self.message
            .clone()
            .or_else(|| self.error.clone())
            .or_else(|| self.detail.clone())
    }
}

#[derive(Debug, Deserialize)]
struct CheckInAttendee {
    #[serde(default)]
    role: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    checkin_time: Option<String>,
}

/// Talks to the backend's barcode check-in endpoint
#[derive(Debug, Clone)]
pub struct HttpCheckInGateway {
    client: Client,
    endpoint: String,
}

impl HttpCheckInGateway {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: format!("{}/{}", base_url.trim_end_matches('/'), CHECKIN_PATH),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl CheckInGateway for HttpCheckInGateway {
    async fn check_in(&self, identifier: &str) -> Result<AttendanceRecord, CheckInError> {
        info!("Checking in {} via {}", identifier, self.endpoint);

        let response = self
            .client
            .post(&self.endpoint)
            .header("Accept", "application/json")
            .json(&CheckInRequest {
                barcode: identifier,
            })
            .send()
            .await
            .map_err(|e| {
                error!("Check-in request for {} failed: {}", identifier, e);
                CheckInError::NetworkFailure(e.to_string())
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            error!("Failed to read check-in response for {}: {}", identifier, e);
            CheckInError::NetworkFailure(e.to_string())
        })?;

        let result = parse_check_in_response(identifier, status.as_u16(), &body);
        match &result {
            Ok(record) => info!(
                "Checked in {} as {} at {}",
                identifier, record.display_name, record.checked_in_at
            ),
            Err(e) => warn!("Check-in for {} failed: {}", identifier, e),
        }
        result
    }
}

/// Classifies a check-in endpoint reply into a record or a typed failure.
pub fn parse_check_in_response(
    identifier: &str,
    status_code: u16,
    body: &str,
) -> Result<AttendanceRecord, CheckInError> {
    let parsed = serde_json::from_str::<CheckInResponse>(body);

    if !(200..300).contains(&status_code) {
        let reason = parsed
            .ok()
            .and_then(|p| p.reason())
            .unwrap_or_else(|| format!("HTTP status {}", status_code));
        return Err(CheckInError::RejectedByServer(reason));
    }

    let parsed = parsed.map_err(|e| {
        CheckInError::MalformedResponse(format!("body is not a check-in response: {}", e))
    })?;

    match parsed.status.as_deref() {
        Some("success") => {}
        Some(other) => {
            let reason = parsed
                .reason()
                .unwrap_or_else(|| format!("status {}", other));
            return Err(CheckInError::RejectedByServer(reason));
        }
        None => {
            return Err(CheckInError::MalformedResponse(
                "missing status field".to_string(),
            ))
        }
    }

    let attendee = parsed
        .attendee
        .ok_or_else(|| CheckInError::MalformedResponse("missing attendee".to_string()))?;

    let role = attendee
        .role
        .filter(|r| !r.trim().is_empty())
        .ok_or_else(|| CheckInError::MalformedResponse("missing attendee role".to_string()))?;
    let name = attendee
        .name
        .filter(|n| !n.trim().is_empty())
        .ok_or_else(|| CheckInError::MalformedResponse("missing attendee name".to_string()))?;

    let checked_in_at = match attendee.checkin_time {
        Some(raw) => parse_timestamp(&raw).ok_or_else(|| {
            CheckInError::MalformedResponse(format!("unreadable checkin_time: {}", raw))
        })?,
        None => Utc::now(),
    };

    Ok(AttendanceRecord {
        identifier: identifier.to_string(),
        display_name: format!("{} {}", capitalize(role.trim()), name.trim()),
        checked_in_at,
    })
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// RFC 3339, or a naive ISO-8601 datetime taken as UTC
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .map(|naive| Utc.from_utc_datetime(&naive))
}
