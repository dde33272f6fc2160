use chrono::NaiveDate;

use crate::models::EventSummary;

const EVENT_HEADERS: &[&str] = &[
    "Event Name",
    "Host",
    "Department",
    "Start Date",
    "End Date",
    "Start Time",
    "End Time",
    "Venue",
    "Location",
    "Category",
    "Status",
    "Expected Students",
    "Expected Faculty",
    "Expected Community",
    "Expected Others",
    "Description",
    "Goals",
];

/// Quotes a field only when it would otherwise break the row.
pub fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

pub fn csv_row<S: AsRef<str>>(fields: &[S]) -> String {
    fields
        .iter()
        .map(|field| csv_field(field.as_ref()))
        .collect::<Vec<_>>()
        .join(",")
}

fn optional_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

/// The review dashboard's event export
pub fn events_to_csv(events: &[EventSummary]) -> String {
    let mut rows = vec![csv_row(EVENT_HEADERS)];

    rows.extend(events.iter().map(|event| {
        csv_row(&[
            event.name.clone(),
            event.host.clone(),
            event.department.clone(),
            optional_date(event.start_date),
            optional_date(event.end_date),
            event.start_time.clone().unwrap_or_default(),
            event.end_time.clone().unwrap_or_default(),
            event.venue.clone(),
            event.location.clone(),
            event.category.clone(),
            event.status.to_string(),
            event.expected_students.unwrap_or(0).to_string(),
            event.expected_faculty.unwrap_or(0).to_string(),
            event.expected_community.unwrap_or(0).to_string(),
            event.expected_others.unwrap_or(0).to_string(),
            event.description.clone(),
            event.goals.clone(),
        ])
    }));

    rows.join("\n")
}

pub fn filtered_events_filename(date: NaiveDate) -> String {
    format!("filtered_events_{}.csv", date.format("%Y-%m-%d"))
}

pub fn event_filename(event: &EventSummary) -> String {
    let slug: String = event
        .name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    format!("{}_{}.csv", slug.to_lowercase(), event.id)
}

pub fn attendance_filename(event_name: &str) -> String {
    format!("{}_attendance.csv", event_name)
}
