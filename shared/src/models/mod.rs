use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub mod budgets;
pub mod events;

pub use budgets::{Budget, BudgetStatus, BudgetTally};
pub use events::{EventStatus, EventSummary, ExpectedAttendance, UnknownStatus};

/// The authenticated caller. Supplied by the auth layer, never stored.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub email: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
}

impl Identity {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            first_name: None,
            last_name: None,
        }
    }

    pub fn with_name(mut self, first_name: &str, last_name: &str) -> Self {
        self.first_name = Some(first_name.to_string());
        self.last_name = Some(last_name.to_string());
        self
    }
}

/// A confirmed check-in. Never mutated after creation.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    pub identifier: String,
    pub display_name: String,
    pub checked_in_at: DateTime<Utc>,
}

/// Checked-in count against the expected attendee total
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceProgress {
    pub checked_in: usize,
    pub expected: u32,
}

impl AttendanceProgress {
    /// `None` when no attendees were expected
    pub fn ratio(&self) -> Option<f64> {
        if self.expected == 0 {
            None
        } else {
            Some(self.checked_in as f64 / self.expected as f64)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_ratio() {
        let progress = AttendanceProgress {
            checked_in: 3,
            expected: 12,
        };
        assert_eq!(progress.ratio(), Some(0.25));

        let none_expected = AttendanceProgress {
            checked_in: 3,
            expected: 0,
        };
        assert_eq!(none_expected.ratio(), None);
    }
}
