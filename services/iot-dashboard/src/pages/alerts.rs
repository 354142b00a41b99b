//! Alert list and resolution

use crate::api::ApiClient;
use crate::guard::{allows, Capability};
use crate::load_state::LoadState;
use crate::model::Alert;
use crate::session::Session;

pub const RESOLVE_FAILED: &str = "Failed to resolve alert";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveOutcome {
    Resolved,
    AlreadyResolved,
    Failed,
}

#[derive(Debug, Clone)]
pub struct AlertListPage {
    pub alerts: LoadState<Vec<Alert>>,
    pub banner: Option<String>,
    pub can_resolve: bool,
}

impl AlertListPage {
    pub async fn load(api: &ApiClient, session: &Session) -> Self {
        Self {
            alerts: LoadState::load(api.alerts().list(), "Failed to fetch alerts").await,
            banner: None,
            can_resolve: allows(session, Capability::Authenticated),
        }
    }

    fn find(&self, id: &str) -> Option<&Alert> {
        self.alerts.ready()?.iter().find(|a| a.id == id)
    }

    /// Resolve one alert and merge the result into the loaded list
    ///
    /// The list is left untouched when the backend call fails.
    pub async fn resolve(&mut self, api: &ApiClient, id: &str) -> ResolveOutcome {
        if self.find(id).is_some_and(|a| a.resolved) {
            tracing::debug!("Alert {} already resolved", id);
            return ResolveOutcome::AlreadyResolved;
        }

        match api.alerts().resolve(id).await {
            Ok(updated) => {
                if let Some(alerts) = self.alerts.ready_mut() {
                    merge_resolved(alerts, id, updated);
                }
                tracing::info!("Resolved alert {}", id);
                ResolveOutcome::Resolved
            }
            Err(e) => {
                tracing::warn!("Failed to resolve alert {}: {}", id, e);
                self.banner = Some(RESOLVE_FAILED.to_string());
                ResolveOutcome::Failed
            }
        }
    }
}

/// Replace the alert with the echoed record, or just flip its flag
pub fn merge_resolved(alerts: &mut [Alert], id: &str, updated: Option<Alert>) {
    if let Some(alert) = alerts.iter_mut().find(|a| a.id == id) {
        match updated {
            Some(updated) if updated.id == id => *alert = Alert { resolved: true, ..updated },
            _ => alert.resolved = true,
        }
    }
}
