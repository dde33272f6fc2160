use emp_shared::models::{AttendanceProgress, EventStatus};
use emp_shared::registration::{Affiliation, GuestRegistration};
use emp_shared::visibility::FilterCriteria;
use serde::{Deserialize, Serialize};

use crate::error::Result;

// Request DTOs
#[derive(Deserialize, Debug, Default)]
pub struct EventQuery {
    pub search: Option<String>,
    pub status: Option<String>,
    pub department: Option<String>,
}

fn unless_all(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty() && !v.eq_ignore_ascii_case("all"))
}

impl EventQuery {
    pub fn into_criteria(self) -> Result<FilterCriteria> {
        let status = match unless_all(self.status) {
            Some(raw) => Some(raw.parse::<EventStatus>()?),
            None => None,
        };

        Ok(FilterCriteria {
            search: self.search.filter(|s| !s.is_empty()),
            status,
            department: unless_all(self.department),
        })
    }
}

#[derive(Deserialize, Debug, Default)]
pub struct BudgetQuery {
    pub event: Option<i64>,
}

#[derive(Deserialize, Debug)]
pub struct UpdateStatusRequest {
    pub status: String,
}

#[derive(Deserialize, Debug)]
pub struct ScanRequest {
    pub barcode: String,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct GuestRegistrationRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: String,
    pub affiliation: Affiliation,
    #[serde(default)]
    pub aurak_id: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub organization: Option<String>,
    #[serde(default)]
    pub position: Option<String>,
    #[serde(default)]
    pub dietary_restrictions: Option<String>,
    #[serde(default)]
    pub special_requests: Option<String>,
}

impl From<GuestRegistrationRequest> for GuestRegistration {
    fn from(req: GuestRegistrationRequest) -> Self {
        GuestRegistration {
            first_name: req.first_name,
            last_name: req.last_name,
            email: req.email,
            phone_number: req.phone_number,
            affiliation: req.affiliation,
            aurak_id: req.aurak_id,
            department: req.department,
            organization: req.organization,
            position: req.position,
            dietary_restrictions: req.dietary_restrictions,
            special_requests: req.special_requests,
        }
        .normalized()
    }
}

// Response DTOs
#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ProgressResponse {
    pub checked_in: usize,
    pub expected: u32,
    pub ratio: Option<f64>,
}

impl From<AttendanceProgress> for ProgressResponse {
    fn from(progress: AttendanceProgress) -> Self {
        Self {
            checked_in: progress.checked_in,
            expected: progress.expected,
            ratio: progress.ratio(),
        }
    }
}
