use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use emp_shared::access::{AccessConfig, Role};
use emp_shared::api::EventSource;
use emp_shared::auth::AuthMode;
use emp_shared::gateway::CheckInGateway;
use emp_shared::models::Identity;
use emp_shared::session::AttendanceSession;
use log::info;
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use crate::error::{AppError, Result};

const DEFAULT_SESSION_IDLE: Duration = Duration::from_secs(2 * 60 * 60);

/// An open attendance view, owned by whoever opened it
pub struct AttendanceVisit {
    pub owner: String,
    pub session: AttendanceSession,
    pub last_seen: DateTime<Utc>,
}

impl AttendanceVisit {
    pub fn new(owner: String, session: AttendanceSession) -> Self {
        Self {
            owner,
            session,
            last_seen: Utc::now(),
        }
    }

    pub fn is_idle(&self, now: DateTime<Utc>, idle: Duration) -> bool {
        (now - self.last_seen)
            .to_std()
            .map(|age| age > idle)
            .unwrap_or(false)
    }
}

pub type SessionMap = HashMap<Uuid, AttendanceVisit>;

#[derive(Clone)]
pub struct AppState {
    pub events: Arc<dyn EventSource>,
    pub gateway: Arc<dyn CheckInGateway>,
    access: Arc<RwLock<AccessConfig>>,
    access_path: Option<PathBuf>,
    pub auth: AuthMode,
    session_idle: Duration,
    pub sessions: Arc<Mutex<SessionMap>>,
}

impl AppState {
    pub fn new(
        events: Arc<dyn EventSource>,
        gateway: Arc<dyn CheckInGateway>,
        access: AccessConfig,
        auth: AuthMode,
    ) -> Self {
        Self {
            events,
            gateway,
            access: Arc::new(RwLock::new(access)),
            access_path: None,
            auth,
            session_idle: DEFAULT_SESSION_IDLE,
            sessions: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Where `reload_access` re-reads the tables from
    pub fn with_access_path(mut self, path: PathBuf) -> Self {
        self.access_path = Some(path);
        self
    }

    pub fn with_session_idle(mut self, idle: Duration) -> Self {
        self.session_idle = idle;
        self
    }

    pub async fn resolve_role(&self, identity: &Identity) -> Role {
        self.access.read().await.resolve_role(&identity.email)
    }

    pub async fn is_treasurer(&self, identity: &Identity) -> bool {
        self.access.read().await.is_treasurer(&identity.email)
    }

    pub async fn replace_access(&self, access: AccessConfig) {
        *self.access.write().await = access;
    }

    pub async fn reload_access(&self) -> Result<AccessConfig> {
        let path = self
            .access_path
            .as_ref()
            .ok_or_else(|| AppError::bad_request("No access config file is configured".into()))?;

        let access = AccessConfig::load(path)?;
        self.replace_access(access.clone()).await;
        info!("Access config reloaded from {}", path.display());

        Ok(access)
    }

    /// Drops every session left idle past the configured window
    pub fn evict_idle(&self, sessions: &mut SessionMap) -> usize {
        let now = Utc::now();
        let before = sessions.len();
        sessions.retain(|id, visit| {
            let idle = visit.is_idle(now, self.session_idle);
            if idle {
                info!(
                    "Discarding idle attendance session {} for event {}",
                    id,
                    visit.session.event_id()
                );
            }
            !idle
        });
        before - sessions.len()
    }

    /// Looks up a session the caller owns and marks it as used.
    /// An idle session is discarded and reported as missing.
    pub fn touch_visit<'a>(
        &self,
        sessions: &'a mut SessionMap,
        id: &Uuid,
        identity: &Identity,
    ) -> Result<&'a mut AttendanceVisit> {
        let now = Utc::now();
        let idle = sessions
            .get(id)
            .map(|visit| visit.is_idle(now, self.session_idle))
            .ok_or_else(session_not_found)?;

        if idle {
            sessions.remove(id);
            info!("Attendance session {} expired after inactivity", id);
            return Err(session_not_found());
        }

        let visit = sessions.get_mut(id).ok_or_else(session_not_found)?;
        if visit.owner != identity.email {
            return Err(AppError::forbidden(
                "You don't have access to this attendance session".into(),
            ));
        }

        visit.last_seen = now;
        Ok(visit)
    }
}

fn session_not_found() -> AppError {
    AppError::not_found("Attendance session not found".into())
}
