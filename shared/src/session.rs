use log::{info, warn};
use serde::Serialize;
use thiserror::Error;

use crate::export::attendance_filename;
use crate::gateway::{CheckInError, CheckInGateway};
use crate::ledger::{AttendanceLedger, DuplicateError};
use crate::models::{AttendanceProgress, AttendanceRecord, EventSummary, ExpectedAttendance};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScanError {
    #[error("Scanned identifier is empty")]
    EmptyIdentifier,

    #[error(transparent)]
    Duplicate(#[from] DuplicateError),

    #[error(transparent)]
    CheckIn(#[from] CheckInError),

    #[error("Attendance session was closed before the check-in completed")]
    SessionClosed,
}

/// One visit to an event's attendance view: the ledger lives exactly as long as this.
#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceSession {
    event_name: String,
    expected: ExpectedAttendance,
    ledger: AttendanceLedger,
}

impl AttendanceSession {
    pub fn open(event: &EventSummary) -> Self {
        info!("Opening attendance session for event {} ({})", event.id, event.name);
        Self {
            event_name: event.name.clone(),
            expected: event.expected_attendance(),
            ledger: AttendanceLedger::new(event.id),
        }
    }

    pub fn event_id(&self) -> i64 {
        self.ledger.event_id()
    }

    pub fn event_name(&self) -> &str {
        &self.event_name
    }

    pub fn ledger(&self) -> &AttendanceLedger {
        &self.ledger
    }

    /// Normalises a scanned value and rejects it before any network call
    /// if it is blank or already recorded.
    pub fn begin_scan(&self, raw: &str) -> Result<String, ScanError> {
        let identifier = raw.trim();
        if identifier.is_empty() {
            return Err(ScanError::EmptyIdentifier);
        }

        if self.ledger.contains(identifier) {
            warn!(
                "{} already checked in for event {}",
                identifier,
                self.event_id()
            );
            return Err(DuplicateError {
                identifier: identifier.to_string(),
            }
            .into());
        }

        Ok(identifier.to_string())
    }

    /// Records a gateway-confirmed check-in. A concurrent scan of the same
    /// identifier that finished first makes this a duplicate.
    pub fn complete_scan(&mut self, confirmed: AttendanceRecord) -> Result<AttendanceRecord, ScanError> {
        let record = self.ledger.record(
            &confirmed.identifier,
            &confirmed.display_name,
            confirmed.checked_in_at,
        )?;

        info!(
            "Recorded {} for event {} ({} checked in)",
            record.display_name,
            self.event_id(),
            self.ledger.len()
        );
        Ok(record)
    }

    pub async fn scan<G>(&mut self, gateway: &G, raw: &str) -> Result<AttendanceRecord, ScanError>
    where
        G: CheckInGateway + ?Sized,
    {
        let identifier = self.begin_scan(raw)?;
        let confirmed = gateway.check_in(&identifier).await?;
        self.complete_scan(confirmed)
    }

    pub fn progress(&self) -> AttendanceProgress {
        self.ledger.progress(&self.expected)
    }

    pub fn export_csv(&self) -> String {
        self.ledger.to_csv()
    }

    pub fn export_filename(&self) -> String {
        attendance_filename(&self.event_name)
    }
}
