use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Review state of an event request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventStatus {
    Pending,
    Approved,
    Denied,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown status: {0}")]
pub struct UnknownStatus(pub String);

impl EventStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventStatus::Pending => "Pending",
            EventStatus::Approved => "Approved",
            EventStatus::Denied => "Denied",
        }
    }
}

impl fmt::Display for EventStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Ok(EventStatus::Pending),
            "approved" => Ok(EventStatus::Approved),
            "denied" => Ok(EventStatus::Denied),
            _ => Err(UnknownStatus(s.to_string())),
        }
    }
}

impl Serialize for EventStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for EventStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Event record as returned by the backend's event list/detail endpoints
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct EventSummary {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub host: String,
    #[serde(default)]
    pub department: String,
    pub status: EventStatus,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub end_time: Option<String>,
    #[serde(default)]
    pub venue: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub goals: String,
    #[serde(default)]
    pub expected_students: Option<u32>,
    #[serde(default)]
    pub expected_faculty: Option<u32>,
    #[serde(default)]
    pub expected_community: Option<u32>,
    #[serde(default)]
    pub expected_others: Option<u32>,
}

impl EventSummary {
    pub fn expected_attendance(&self) -> ExpectedAttendance {
        ExpectedAttendance {
            students: self.expected_students,
            faculty: self.expected_faculty,
            community: self.expected_community,
            others: self.expected_others,
        }
    }
}

/// Per-category expected attendee counts; absent counts are zero.
/// The total saturates at `u32::MAX` rather than wrapping.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExpectedAttendance {
    pub students: Option<u32>,
    pub faculty: Option<u32>,
    pub community: Option<u32>,
    pub others: Option<u32>,
}

impl ExpectedAttendance {
    pub fn total(&self) -> u32 {
        [self.students, self.faculty, self.community, self.others]
            .iter()
            .map(|count| count.unwrap_or(0))
            .fold(0u32, u32::saturating_add)
    }
}
