use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use log::{info, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read access config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid access config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// What a caller may review, derived from their email
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "role", rename_all = "kebab-case")]
pub enum Role {
    UltimateAdmin,
    DepartmentAdmin { department: String },
    Admin,
    User,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::UltimateAdmin => "ultimate-admin",
            Role::DepartmentAdmin { .. } => "department-admin",
            Role::Admin => "admin",
            Role::User => "user",
        }
    }

    pub fn department(&self) -> Option<&str> {
        match self {
            Role::DepartmentAdmin { department } => Some(department),
            _ => None,
        }
    }

    /// Whether the role may approve or deny event requests
    pub fn can_review(&self) -> bool {
        match self {
            Role::UltimateAdmin | Role::DepartmentAdmin { .. } | Role::Admin => true,
            Role::User => false,
        }
    }
}

/// Static admin tables, loaded at startup and injected wherever roles are resolved.
///
/// Email lookups are exact: no case folding is applied to either side.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AccessConfig {
    #[serde(default)]
    pub ultimate_admins: BTreeSet<String>,
    /// email -> department name as entered in the seed data
    #[serde(default)]
    pub department_admins: BTreeMap<String, String>,
    #[serde(default)]
    pub privileged_users: BTreeSet<String>,
    /// May grant or deny budget line items, independent of role
    #[serde(default)]
    pub treasurers: BTreeSet<String>,
}

impl AccessConfig {
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::from_json_str(&raw)?;

        info!(
            "Loaded access config from {}: {} ultimate admins, {} department admins, {} privileged users, {} treasurers",
            path.display(),
            config.ultimate_admins.len(),
            config.department_admins.len(),
            config.privileged_users.len(),
            config.treasurers.len()
        );

        Ok(config)
    }

    /// First match wins: ultimate admins, department admins, privileged users, then `User`.
    pub fn resolve_role(&self, email: &str) -> Role {
        if self.ultimate_admins.contains(email) {
            return Role::UltimateAdmin;
        }

        if let Some(department) = self.department_admins.get(email) {
            return Role::DepartmentAdmin {
                department: department.clone(),
            };
        }

        if self.privileged_users.contains(email) {
            return Role::Admin;
        }

        if self.has_case_insensitive_match(email) {
            warn!(
                "Email {} only matches an access table entry with different casing; resolving as user",
                email
            );
        }

        Role::User
    }

    pub fn is_treasurer(&self, email: &str) -> bool {
        self.treasurers.contains(email)
    }

    fn has_case_insensitive_match(&self, email: &str) -> bool {
        self.ultimate_admins
            .iter()
            .chain(self.department_admins.keys())
            .chain(self.privileged_users.iter())
            .any(|entry| entry.eq_ignore_ascii_case(email))
    }
}

/// Canonical form used when comparing department names:
/// lower-cased, `&` spelled `and`, whitespace runs collapsed, trimmed.
pub fn normalize_department(department: &str) -> String {
    department
        .to_lowercase()
        .replace('&', " and ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> AccessConfig {
        AccessConfig::from_json_str(
            r#"{
                "ultimateAdmins": ["student.life@aurak.ac.ae", "qutaiba.raid@gmail.com"],
                "departmentAdmins": {
                    "fayez.moutassem@aurak.ac.ae": "Department of Civil and infrastructure Engineering",
                    "qutaiba.raid@gmail.com": "Department of Management"
                },
                "privilegedUsers": ["admin@aurak.ac.ae", "Imad.hoballah@aurak.ac.ae", "qutaiba.raid@gmail.com"],
                "treasurers": ["finance@aurak.ac.ae"]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_ultimate_admin_wins_over_other_tables() {
        assert_eq!(
            config().resolve_role("qutaiba.raid@gmail.com"),
            Role::UltimateAdmin
        );
    }

    #[test]
    fn test_department_admin_carries_department() {
        let role = config().resolve_role("fayez.moutassem@aurak.ac.ae");
        assert_eq!(role.as_str(), "department-admin");
        assert_eq!(
            role.department(),
            Some("Department of Civil and infrastructure Engineering")
        );
        assert!(role.can_review());
    }

    #[test]
    fn test_privileged_and_default_roles() {
        let config = config();
        assert_eq!(config.resolve_role("admin@aurak.ac.ae"), Role::Admin);
        assert_eq!(config.resolve_role("someone@aurak.ac.ae"), Role::User);
        assert!(!Role::User.can_review());
    }

    #[test]
    fn test_email_lookup_is_case_sensitive() {
        let config = config();
        assert_eq!(config.resolve_role("Imad.hoballah@aurak.ac.ae"), Role::Admin);
        assert_eq!(config.resolve_role("imad.hoballah@aurak.ac.ae"), Role::User);
        assert_eq!(config.resolve_role("ADMIN@aurak.ac.ae"), Role::User);
    }

    #[test]
    fn test_treasurer_is_separate_from_role() {
        let config = config();
        assert!(config.is_treasurer("finance@aurak.ac.ae"));
        assert_eq!(config.resolve_role("finance@aurak.ac.ae"), Role::User);
        assert!(!config.is_treasurer("student.life@aurak.ac.ae"));
        assert!(!config.is_treasurer("FINANCE@aurak.ac.ae"));
    }

    #[test]
    fn test_missing_tables_default_to_empty() {
        let config = AccessConfig::from_json_str("{}").unwrap();
        assert_eq!(config, AccessConfig::default());
        assert_eq!(config.resolve_role("admin@aurak.ac.ae"), Role::User);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        assert!(matches!(
            AccessConfig::from_json_str("{\"ultimateAdmins\": 5}"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_role_serializes_tagged() {
        let json = serde_json::to_value(Role::DepartmentAdmin {
            department: "Department of Biotechnology".to_string(),
        })
        .unwrap();
        assert_eq!(json["role"], "department-admin");
        assert_eq!(json["department"], "Department of Biotechnology");

        let json = serde_json::to_value(Role::UltimateAdmin).unwrap();
        assert_eq!(json["role"], "ultimate-admin");
    }

    #[test]
    fn test_normalize_department() {
        assert_eq!(
            normalize_department("  Department of Accounting &  Finance "),
            "department of accounting and finance"
        );
        assert_eq!(
            normalize_department("Department of Electrical&Electronics\tEngineering"),
            "department of electrical and electronics engineering"
        );
    }
}
