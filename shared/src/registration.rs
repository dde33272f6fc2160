use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Deserialize, Serialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Affiliation {
    Faculty,
    #[default]
    Student,
    Staff,
    External,
}

/// A guest's answers to the public invitation form, in the backend's field names
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct GuestRegistration {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: String,
    pub affiliation: Affiliation,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aurak_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dietary_restrictions: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub special_requests: Option<String>,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: &'static str,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid registration: {}", summary(.fields))]
pub struct RegistrationError {
    pub fields: Vec<FieldError>,
}

fn summary(fields: &[FieldError]) -> String {
    fields
        .iter()
        .map(|e| e.message)
        .collect::<Vec<_>>()
        .join("; ")
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn looks_like_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain
                    .split_once('.')
                    .map(|(host, tld)| !host.is_empty() && !tld.is_empty())
                    .unwrap_or(false)
        }
        None => false,
    }
}

impl GuestRegistration {
    /// Trims every field and turns blank optional answers into `None`
    pub fn normalized(self) -> Self {
        Self {
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            email: self.email.trim().to_string(),
            phone_number: self.phone_number.trim().to_string(),
            affiliation: self.affiliation,
            aurak_id: non_blank(self.aurak_id),
            department: non_blank(self.department),
            organization: non_blank(self.organization),
            position: non_blank(self.position),
            dietary_restrictions: non_blank(self.dietary_restrictions),
            special_requests: non_blank(self.special_requests),
        }
    }

    pub fn validate(&self) -> Result<(), RegistrationError> {
        let mut fields = Vec::new();

        if self.first_name.trim().chars().count() < 2 {
            fields.push(FieldError {
                field: "firstName",
                message: "First name must be at least 2 characters",
            });
        }
        if self.last_name.trim().chars().count() < 2 {
            fields.push(FieldError {
                field: "lastName",
                message: "Last name must be at least 2 characters",
            });
        }
        if !looks_like_email(self.email.trim()) {
            fields.push(FieldError {
                field: "email",
                message: "Please enter a valid email address",
            });
        }
        if self.phone_number.chars().filter(|c| c.is_ascii_digit()).count() < 10 {
            fields.push(FieldError {
                field: "phoneNumber",
                message: "Phone number must be at least 10 digits",
            });
        }

        let has_aurak_id = self
            .aurak_id
            .as_deref()
            .map(|id| !id.trim().is_empty())
            .unwrap_or(false);
        if self.affiliation != Affiliation::External && !has_aurak_id {
            fields.push(FieldError {
                field: "aurakId",
                message: "AURAK ID is required for faculty, students, and staff",
            });
        }

        if fields.is_empty() {
            Ok(())
        } else {
            Err(RegistrationError { fields })
        }
    }
}
