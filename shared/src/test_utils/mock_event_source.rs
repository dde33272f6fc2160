use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::api::{ApiError, EventSource, GuestPass};
use crate::models::{Budget, BudgetStatus, EventStatus, EventSummary};
use crate::registration::GuestRegistration;

/// In-memory stand-in for the events backend
#[derive(Default)]
pub struct MockEventSource {
    events: Mutex<Vec<EventSummary>>,
    budgets: Mutex<Vec<Budget>>,
    registrations: Mutex<Vec<(i64, GuestRegistration)>>,
}

impl MockEventSource {
    pub fn new(events: Vec<EventSummary>) -> Self {
        Self {
            events: Mutex::new(events),
            budgets: Mutex::new(Vec::new()),
            registrations: Mutex::new(Vec::new()),
        }
    }

    pub fn with_budgets(self, budgets: Vec<Budget>) -> Self {
        Self {
            budgets: Mutex::new(budgets),
            ..self
        }
    }

    pub async fn registrations(&self) -> Vec<(i64, GuestRegistration)> {
        self.registrations.lock().await.clone()
    }

    fn not_found(id: i64) -> ApiError {
        ApiError::Status {
            status: 404,
            body: format!("event {} not found", id),
        }
    }

    fn budget_not_found(id: i64) -> ApiError {
        ApiError::Status {
            status: 404,
            body: format!("budget {} not found", id),
        }
    }
}

#[async_trait]
impl EventSource for MockEventSource {
    async fn list_events(&self, _token: Option<&str>) -> Result<Vec<EventSummary>, ApiError> {
        Ok(self.events.lock().await.clone())
    }

    async fn get_event(&self, id: i64, _token: Option<&str>) -> Result<EventSummary, ApiError> {
        self.events
            .lock()
            .await
            .iter()
            .find(|e| e.id == id)
            .cloned()
            .ok_or_else(|| Self::not_found(id))
    }

    async fn update_status(
        &self,
        id: i64,
        status: EventStatus,
        _token: Option<&str>,
    ) -> Result<EventSummary, ApiError> {
        let mut events = self.events.lock().await;
        let event = events
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or_else(|| Self::not_found(id))?;
        event.status = status;
        Ok(event.clone())
    }

    async fn register_guest(
        &self,
        event_id: i64,
        registration: &GuestRegistration,
    ) -> Result<GuestPass, ApiError> {
        if !self.events.lock().await.iter().any(|e| e.id == event_id) {
            return Err(Self::not_found(event_id));
        }

        let mut registrations = self.registrations.lock().await;
        registrations.push((event_id, registration.clone()));
        Ok(GuestPass {
            barcode: format!("GUEST{:05}", registrations.len()),
        })
    }

    async fn list_budgets(
        &self,
        event_id: Option<i64>,
        _token: Option<&str>,
    ) -> Result<Vec<Budget>, ApiError> {
        Ok(self
            .budgets
            .lock()
            .await
            .iter()
            .filter(|b| event_id.map_or(true, |id| b.event == id))
            .cloned()
            .collect())
    }

    async fn update_budget_status(
        &self,
        id: i64,
        status: BudgetStatus,
        _token: Option<&str>,
    ) -> Result<Budget, ApiError> {
        let mut budgets = self.budgets.lock().await;
        let budget = budgets
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or_else(|| Self::budget_not_found(id))?;
        budget.budget_status = status;
        Ok(budget.clone())
    }
}
