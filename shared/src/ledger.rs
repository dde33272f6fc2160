use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::export::csv_row;
use crate::models::{AttendanceProgress, AttendanceRecord, ExpectedAttendance};

pub const ATTENDANCE_CSV_HEADER: &str = "ID,Name,Timestamp";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{identifier} has already been checked in")]
pub struct DuplicateError {
    pub identifier: String,
}

/// Check-ins for one event, in the order they were recorded.
/// No two records share an identifier.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceLedger {
    event_id: i64,
    records: Vec<AttendanceRecord>,
}

impl AttendanceLedger {
    pub fn new(event_id: i64) -> Self {
        Self {
            event_id,
            records: Vec::new(),
        }
    }

    pub fn event_id(&self) -> i64 {
        self.event_id
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.records.iter().any(|r| r.identifier == identifier)
    }

    pub fn record(
        &mut self,
        identifier: &str,
        display_name: &str,
        checked_in_at: DateTime<Utc>,
    ) -> Result<AttendanceRecord, DuplicateError> {
        if self.contains(identifier) {
            return Err(DuplicateError {
                identifier: identifier.to_string(),
            });
        }

        let record = AttendanceRecord {
            identifier: identifier.to_string(),
            display_name: display_name.to_string(),
            checked_in_at,
        };
        self.records.push(record.clone());

        Ok(record)
    }

    pub fn records(&self) -> &[AttendanceRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn export(&self) -> Vec<(String, String, DateTime<Utc>)> {
        self.records
            .iter()
            .map(|r| (r.identifier.clone(), r.display_name.clone(), r.checked_in_at))
            .collect()
    }

    /// Header row then one row per record. Timestamps keep full precision.
    pub fn to_csv(&self) -> String {
        let mut rows = vec![ATTENDANCE_CSV_HEADER.to_string()];
        rows.extend(self.records.iter().map(|r| {
            csv_row(&[
                r.identifier.clone(),
                r.display_name.clone(),
                r.checked_in_at.to_rfc3339_opts(SecondsFormat::AutoSi, true),
            ])
        }));
        rows.join("\n")
    }

    pub fn progress(&self, expected: &ExpectedAttendance) -> AttendanceProgress {
        AttendanceProgress {
            checked_in: self.len(),
            expected: expected.total(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t(minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 5, 14, 9, minute, 0).unwrap()
    }

    #[test]
    fn test_duplicate_scan_scenario() {
        let mut ledger = AttendanceLedger::new(1);
        assert!(ledger.is_empty());

        let record = ledger.record("A123", "Student Jane Doe", t(0)).unwrap();
        assert_eq!(record.identifier, "A123");
        assert_eq!(ledger.len(), 1);

        let err = ledger.record("A123", "Student Someone Else", t(5)).unwrap_err();
        assert_eq!(err.identifier, "A123");
        assert_eq!(ledger.len(), 1);

        assert_eq!(
            ledger.export(),
            vec![("A123".to_string(), "Student Jane Doe".to_string(), t(0))]
        );
    }

    #[test]
    fn test_export_keeps_insertion_order() {
        let mut ledger = AttendanceLedger::new(1);
        ledger.record("C3", "Guest Carol", t(9)).unwrap();
        ledger.record("A1", "Student Ann", t(1)).unwrap();
        ledger.record("B2", "Faculty Bob", t(4)).unwrap();

        let ids: Vec<String> = ledger.export().into_iter().map(|(id, _, _)| id).collect();
        assert_eq!(ids, vec!["C3", "A1", "B2"]);
    }

    #[test]
    fn test_csv_reparses_to_recorded_tuples() {
        let mut ledger = AttendanceLedger::new(4);
        ledger.record("A123", "Student Jane Doe", t(0)).unwrap();
        ledger
            .record(
                "7F3K9Q2ZXA",
                "Faculty Omar Haddad",
                Utc.timestamp_opt(1_715_677_200, 123_456_000).unwrap(),
            )
            .unwrap();

        let csv = ledger.to_csv();
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some(ATTENDANCE_CSV_HEADER));

        let reparsed: Vec<(String, String, DateTime<Utc>)> = lines
            .map(|line| {
                let fields: Vec<&str> = line.split(',').collect();
                assert_eq!(fields.len(), 3);
                (
                    fields[0].to_string(),
                    fields[1].to_string(),
                    DateTime::parse_from_rfc3339(fields[2])
                        .unwrap()
                        .with_timezone(&Utc),
                )
            })
            .collect();

        assert_eq!(reparsed, ledger.export());
    }

    #[test]
    fn test_csv_quotes_names_with_commas() {
        let mut ledger = AttendanceLedger::new(4);
        ledger.record("A1", "Student Doe, Jane", t(0)).unwrap();
        assert_eq!(
            ledger.to_csv(),
            "ID,Name,Timestamp\nA1,\"Student Doe, Jane\",2025-05-14T09:00:00Z"
        );
    }

    #[test]
    fn test_progress_against_expected_total() {
        let mut ledger = AttendanceLedger::new(2);
        ledger.record("A1", "Student Ann", t(0)).unwrap();
        ledger.record("A2", "Student Ben", t(1)).unwrap();

        let expected = ExpectedAttendance {
            students: Some(6),
            faculty: None,
            community: Some(2),
            others: None,
        };
        let progress = ledger.progress(&expected);
        assert_eq!(progress.checked_in, 2);
        assert_eq!(progress.expected, 8);
        assert_eq!(progress.ratio(), Some(0.25));
    }
}
