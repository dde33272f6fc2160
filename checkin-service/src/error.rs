use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use emp_shared::access::ConfigError;
use emp_shared::api::ApiError;
use emp_shared::gateway::CheckInError;
use emp_shared::models::UnknownStatus;
use emp_shared::registration::RegistrationError;
use emp_shared::session::ScanError;
use log::error;

#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    message: String,
    details: Option<serde_json::Value>,
}

pub type Result<T> = std::result::Result<T, AppError>;

impl AppError {
    pub fn new(status: StatusCode, message: String) -> Self {
        Self {
            status,
            message,
            details: None,
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    pub fn bad_request(message: String) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized(message: String) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn forbidden(message: String) -> Self {
        Self::new(StatusCode::FORBIDDEN, message)
    }

    pub fn not_found(message: String) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn conflict(message: String) -> Self {
        Self::new(StatusCode::CONFLICT, message)
    }

    pub fn gone(message: String) -> Self {
        Self::new(StatusCode::GONE, message)
    }

    pub fn bad_gateway(message: String) -> Self {
        Self::new(StatusCode::BAD_GATEWAY, message)
    }

    pub fn internal(message: String) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!("Request failed with {}: {}", self.status, self.message);
        }

        let mut body = serde_json::json!({ "error": self.message });
        if let Some(details) = self.details {
            body["details"] = details;
        }

        (self.status, Json(body)).into_response()
    }
}

impl From<ApiError> for AppError {
    fn from(err: ApiError) -> Self {
        if err.is_not_found() {
            return AppError::not_found("The requested event was not found".into());
        }

        match &err {
            ApiError::Status { status: 401, .. } => AppError::unauthorized(err.to_string()),
            ApiError::Status { status: 403, .. } => AppError::forbidden(err.to_string()),
            _ => AppError::bad_gateway(err.to_string()),
        }
    }
}

impl From<ScanError> for AppError {
    fn from(err: ScanError) -> Self {
        match err {
            ScanError::EmptyIdentifier => AppError::bad_request(err.to_string()),
            ScanError::Duplicate(_) => AppError::conflict(err.to_string()),
            ScanError::CheckIn(e) => AppError::bad_gateway(format!("Scan failed: {}", e)),
            ScanError::SessionClosed => AppError::gone(err.to_string()),
        }
    }
}

impl From<CheckInError> for AppError {
    fn from(err: CheckInError) -> Self {
        ScanError::from(err).into()
    }
}

impl From<RegistrationError> for AppError {
    fn from(err: RegistrationError) -> Self {
        let details = serde_json::to_value(&err.fields).unwrap_or_default();
        AppError::bad_request(err.to_string()).with_details(details)
    }
}

impl From<UnknownStatus> for AppError {
    fn from(err: UnknownStatus) -> Self {
        AppError::bad_request(err.to_string())
    }
}

impl From<ConfigError> for AppError {
    fn from(err: ConfigError) -> Self {
        AppError::internal(err.to_string())
    }
}
