use std::path::PathBuf;
use std::time::Duration;

use emp_shared::access::ConfigError;
use emp_shared::auth::AuthMode;
use log::warn;
use thiserror::Error;

const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:8000/api";
const DEFAULT_ACCESS_CONFIG: &str = "config/access.json";
const DEFAULT_CHECKIN_TIMEOUT_SECS: u64 = 10;
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_SESSION_IDLE_MINS: u64 = 120;

#[derive(Error, Debug)]
pub enum StartupError {
    #[error("Invalid value for {name}: {value}")]
    InvalidVar { name: &'static str, value: String },

    #[error("JWT_SECRET is not set; set TRUST_UPSTREAM_AUTH=true only if a gateway verifies tokens")]
    MissingSecret,

    #[error(transparent)]
    Access(#[from] ConfigError),

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Server error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    pub api_base_url: String,
    pub access_config_path: PathBuf,
    pub checkin_timeout: Duration,
    pub port: u16,
    pub route_prefix: String,
    pub auth: AuthMode,
    /// Attendance sessions untouched for longer than this are discarded
    pub session_idle: Duration,
}

fn is_true(value: Option<String>) -> bool {
    value.map(|v| v.to_lowercase() == "true").unwrap_or(false)
}

impl ServiceConfig {
    pub fn from_env() -> Result<Self, StartupError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, StartupError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_base_url =
            lookup("EMP_API_BASE_URL").unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());
        let access_config_path = PathBuf::from(
            lookup("EMP_ACCESS_CONFIG").unwrap_or_else(|| DEFAULT_ACCESS_CONFIG.to_string()),
        );

        let checkin_timeout = match lookup("CHECKIN_TIMEOUT_SECS") {
            Some(value) => value
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs)
                .ok_or(StartupError::InvalidVar {
                    name: "CHECKIN_TIMEOUT_SECS",
                    value,
                })?,
            None => Duration::from_secs(DEFAULT_CHECKIN_TIMEOUT_SECS),
        };

        let port = match lookup("PORT") {
            Some(value) => value.parse::<u16>().map_err(|_| StartupError::InvalidVar {
                name: "PORT",
                value: value.clone(),
            })?,
            None => DEFAULT_PORT,
        };

        let session_idle = match lookup("SESSION_IDLE_MINS") {
            Some(value) => value
                .parse::<u64>()
                .ok()
                .filter(|mins| *mins > 0)
                .and_then(|mins| mins.checked_mul(60))
                .map(Duration::from_secs)
                .ok_or(StartupError::InvalidVar {
                    name: "SESSION_IDLE_MINS",
                    value,
                })?,
            None => Duration::from_secs(DEFAULT_SESSION_IDLE_MINS * 60),
        };

        // If REMOVE_BASE_PATH is set to true, don't add the /Prod prefix
        let route_prefix = if is_true(lookup("REMOVE_BASE_PATH")) { "" } else { "/Prod" }.to_string();

        let auth = match lookup("JWT_SECRET").filter(|secret| !secret.is_empty()) {
            Some(secret) => AuthMode::Verify { secret },
            None if is_true(lookup("TRUST_UPSTREAM_AUTH")) => {
                warn!("JWT_SECRET is not set: bearer tokens are NOT verified and any claimed email is trusted");
                AuthMode::TrustUpstream
            }
            None => return Err(StartupError::MissingSecret),
        };

        Ok(Self {
            api_base_url,
            access_config_path,
            checkin_timeout,
            port,
            route_prefix,
            auth,
            session_idle,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ServiceConfig::from_lookup(lookup_from(&[("JWT_SECRET", "s3cret")])).unwrap();

        assert_eq!(config.api_base_url, "http://127.0.0.1:8000/api");
        assert_eq!(config.access_config_path, PathBuf::from("config/access.json"));
        assert_eq!(config.checkin_timeout, Duration::from_secs(10));
        assert_eq!(config.port, 3000);
        assert_eq!(config.route_prefix, "/Prod");
        assert_eq!(
            config.auth,
            AuthMode::Verify {
                secret: "s3cret".to_string()
            }
        );
        assert_eq!(config.session_idle, Duration::from_secs(7200));
    }

    #[test]
    fn test_refuses_to_start_without_secret() {
        assert!(matches!(
            ServiceConfig::from_lookup(lookup_from(&[])),
            Err(StartupError::MissingSecret)
        ));
        assert!(matches!(
            ServiceConfig::from_lookup(lookup_from(&[
                ("JWT_SECRET", ""),
                ("TRUST_UPSTREAM_AUTH", "no"),
            ])),
            Err(StartupError::MissingSecret)
        ));
    }

    #[test]
    fn test_trust_upstream_is_explicit_opt_in() {
        let config = ServiceConfig::from_lookup(lookup_from(&[("TRUST_UPSTREAM_AUTH", "true")])).unwrap();
        assert_eq!(config.auth, AuthMode::TrustUpstream);

        let config = ServiceConfig::from_lookup(lookup_from(&[
            ("TRUST_UPSTREAM_AUTH", "true"),
            ("JWT_SECRET", "s3cret"),
        ]))
        .unwrap();
        assert!(matches!(config.auth, AuthMode::Verify { .. }));
    }

    #[test]
    fn test_overrides() {
        let config = ServiceConfig::from_lookup(lookup_from(&[
            ("EMP_API_BASE_URL", "https://emp.aurak.ac.ae/api"),
            ("CHECKIN_TIMEOUT_SECS", "3"),
            ("PORT", "8080"),
            ("REMOVE_BASE_PATH", "TRUE"),
            ("SESSION_IDLE_MINS", "15"),
            ("TRUST_UPSTREAM_AUTH", "true"),
        ]))
        .unwrap();

        assert_eq!(config.api_base_url, "https://emp.aurak.ac.ae/api");
        assert_eq!(config.checkin_timeout, Duration::from_secs(3));
        assert_eq!(config.port, 8080);
        assert_eq!(config.route_prefix, "");
        assert_eq!(config.session_idle, Duration::from_secs(900));
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            ServiceConfig::from_lookup(lookup_from(&[("PORT", "eighty"), ("JWT_SECRET", "k")])),
            Err(StartupError::InvalidVar { name: "PORT", .. })
        ));
        assert!(matches!(
            ServiceConfig::from_lookup(lookup_from(&[("CHECKIN_TIMEOUT_SECS", "0"), ("JWT_SECRET", "k")])),
            Err(StartupError::InvalidVar { name: "CHECKIN_TIMEOUT_SECS", .. })
        ));
    }
}
