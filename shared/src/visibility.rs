use serde::Deserialize;

use crate::access::{normalize_department, Role};
use crate::models::{EventStatus, EventSummary, Identity};

/// Department keywords shared by the submission form and the admin seed data.
/// Two departments are treated as the same when both contain one of these.
const DEPARTMENT_KEYWORDS: &[&str] = &[
    "computer",
    "architecture",
    "chemical",
    "civil",
    "electrical",
    "mechanical",
    "biotechnology",
    "humanities",
    "mathematics",
    "accounting",
    "management",
];

/// Dashboard filter inputs. `None` means "all".
#[derive(Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub status: Option<EventStatus>,
    #[serde(default)]
    pub department: Option<String>,
}

/// Exact match on the normalised names, or a shared department keyword.
pub fn departments_match(event_department: &str, admin_department: &str) -> bool {
    let event = normalize_department(event_department);
    let admin = normalize_department(admin_department);

    if event == admin {
        return true;
    }

    DEPARTMENT_KEYWORDS
        .iter()
        .any(|keyword| event.contains(keyword) && admin.contains(keyword))
}

/// Whether the event's host field names the caller
pub fn is_hosted_by(event: &EventSummary, identity: &Identity) -> bool {
    let host = event.host.to_lowercase();

    [&identity.first_name, &identity.last_name]
        .into_iter()
        .flatten()
        .map(|name| name.trim().to_lowercase())
        .any(|name| !name.is_empty() && host.contains(&name))
}

/// Role scoping alone, before any dashboard criteria
pub fn is_visible_to(event: &EventSummary, role: &Role, identity: &Identity) -> bool {
    match role {
        Role::UltimateAdmin | Role::Admin => true,
        Role::DepartmentAdmin { department } => departments_match(&event.department, department),
        Role::User => is_hosted_by(event, identity),
    }
}

fn matches_criteria(event: &EventSummary, criteria: &FilterCriteria) -> bool {
    if let Some(search) = criteria.search.as_deref().filter(|s| !s.is_empty()) {
        let search = search.to_lowercase();
        if !event.name.to_lowercase().contains(&search)
            && !event.host.to_lowercase().contains(&search)
        {
            return false;
        }
    }

    // EventStatus parsing already folded case on both sides
    if let Some(status) = criteria.status {
        if event.status != status {
            return false;
        }
    }

    if let Some(department) = &criteria.department {
        if &event.department != department {
            return false;
        }
    }

    true
}

/// The events a caller may see, narrowed by the dashboard criteria.
///
/// Borrows the input and keeps its relative order; applying the same
/// criteria to the result returns it unchanged.
pub fn filter_events(
    events: &[EventSummary],
    role: &Role,
    identity: &Identity,
    criteria: &FilterCriteria,
) -> Vec<EventSummary> {
    events
        .iter()
        .filter(|event| is_visible_to(event, role, identity))
        .filter(|event| matches_criteria(event, criteria))
        .cloned()
        .collect()
}

/// Department dropdown values, in first-seen order
pub fn distinct_departments(events: &[EventSummary]) -> Vec<String> {
    let mut departments: Vec<String> = Vec::new();
    for event in events {
        if !departments.contains(&event.department) {
            departments.push(event.department.clone());
        }
    }
    departments
}
