use std::time::Duration;

use async_trait::async_trait;
use log::{error, info};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{Budget, BudgetStatus, EventStatus, EventSummary};
use crate::registration::GuestRegistration;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    #[error("Request to events backend failed: {0}")]
    Request(String),

    #[error("Events backend returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Failed to decode events backend response: {0}")]
    Decode(String),
}

impl ApiError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::Status { status: 404, .. })
    }
}

/// Returned by the backend when a guest registers for an event
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct GuestPass {
    pub barcode: String,
}

/// The parts of the external events backend this system reads and writes.
/// `token` is the caller's bearer token, forwarded as-is.
#[async_trait]
pub trait EventSource: Send + Sync {
    async fn list_events(&self, token: Option<&str>) -> Result<Vec<EventSummary>, ApiError>;

    async fn get_event(&self, id: i64, token: Option<&str>) -> Result<EventSummary, ApiError>;

    async fn update_status(
        &self,
        id: i64,
        status: EventStatus,
        token: Option<&str>,
    ) -> Result<EventSummary, ApiError>;

    async fn register_guest(
        &self,
        event_id: i64,
        registration: &GuestRegistration,
    ) -> Result<GuestPass, ApiError>;

    /// Budget line items, optionally narrowed to one event
    async fn list_budgets(
        &self,
        event_id: Option<i64>,
        token: Option<&str>,
    ) -> Result<Vec<Budget>, ApiError>;

    async fn update_budget_status(
        &self,
        id: i64,
        status: BudgetStatus,
        token: Option<&str>,
    ) -> Result<Budget, ApiError>;
}

#[derive(Debug, Serialize)]
struct StatusUpdate {
    status: EventStatus,
}

#[derive(Debug, Serialize)]
struct BudgetStatusUpdate {
    budget_status: BudgetStatus,
}

#[derive(Debug, Serialize)]
struct GuestRegistrationPayload<'a> {
    #[serde(flatten)]
    registration: &'a GuestRegistration,
    event: i64,
}

#[derive(Debug, Clone)]
pub struct HttpBackendApi {
    client: Client,
    base_url: String,
}

impl HttpBackendApi {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    fn authorized(builder: RequestBuilder, token: Option<&str>) -> RequestBuilder {
        match token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder, what: &str) -> Result<T, ApiError> {
        let response = builder
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| {
                error!("Failed to {}: {}", what, e);
                ApiError::Request(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Events backend returned error status {} while trying to {}: {}", status, what, body);
            return Err(ApiError::Status {
                status: status.as_u16(),
                body,
            });
        }

        response.json::<T>().await.map_err(|e| {
            error!("Failed to parse response while trying to {}: {}", what, e);
            ApiError::Decode(e.to_string())
        })
    }
}

#[async_trait]
impl EventSource for HttpBackendApi {
    async fn list_events(&self, token: Option<&str>) -> Result<Vec<EventSummary>, ApiError> {
        let builder = Self::authorized(self.client.get(self.url("events/")), token);
        let events: Vec<EventSummary> = self.send(builder, "fetch events").await?;
        info!("Fetched {} events from backend", events.len());
        Ok(events)
    }

    async fn get_event(&self, id: i64, token: Option<&str>) -> Result<EventSummary, ApiError> {
        let builder = Self::authorized(self.client.get(self.url(&format!("events/{}/", id))), token);
        self.send(builder, "fetch event").await
    }

    async fn update_status(
        &self,
        id: i64,
        status: EventStatus,
        token: Option<&str>,
    ) -> Result<EventSummary, ApiError> {
        let builder = Self::authorized(
            self.client
                .put(self.url(&format!("events/{}/", id)))
                .json(&StatusUpdate { status }),
            token,
        );
        let event: EventSummary = self.send(builder, "update event status").await?;
        info!("Event {} is now {}", id, event.status);
        Ok(event)
    }

    async fn register_guest(
        &self,
        event_id: i64,
        registration: &GuestRegistration,
    ) -> Result<GuestPass, ApiError> {
        let builder = self
            .client
            .post(self.url("attendance/register/"))
            .json(&GuestRegistrationPayload {
                registration,
                event: event_id,
            });
        let pass: GuestPass = self.send(builder, "register guest").await?;
        info!("Registered guest for event {} with barcode {}", event_id, pass.barcode);
        Ok(pass)
    }

    async fn list_budgets(
        &self,
        event_id: Option<i64>,
        token: Option<&str>,
    ) -> Result<Vec<Budget>, ApiError> {
        let mut builder = self.client.get(self.url("budgets/"));
        if let Some(event_id) = event_id {
            builder = builder.query(&[("event", event_id)]);
        }

        let budgets: Vec<Budget> = self
            .send(Self::authorized(builder, token), "fetch budgets")
            .await?;
        info!("Fetched {} budget items from backend", budgets.len());
        Ok(budgets)
    }

    async fn update_budget_status(
        &self,
        id: i64,
        status: BudgetStatus,
        token: Option<&str>,
    ) -> Result<Budget, ApiError> {
        let builder = Self::authorized(
            self.client
                .put(self.url(&format!("budgets/{}/", id)))
                .json(&BudgetStatusUpdate {
                    budget_status: status,
                }),
            token,
        );
        let budget: Budget = self.send(builder, "update budget status").await?;
        info!("Budget item {} is now {}", id, budget.budget_status);
        Ok(budget)
    }
}
