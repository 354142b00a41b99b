//! `/alerts` endpoints

use serde::Deserialize;

use crate::api::{segment, ApiClient};
use crate::model::Alert;

/// `GET /alerts` answers either a bare array or `{ "alerts": [...] }`
#[derive(Deserialize)]
#[serde(untagged)]
enum AlertList {
    Wrapped { alerts: Vec<Alert> },
    Bare(Vec<Alert>),
}

pub struct AlertsApi<'a> {
    client: &'a ApiClient,
}

impl ApiClient {
    pub fn alerts(&self) -> AlertsApi<'_> {
        AlertsApi { client: self }
    }
}

impl AlertsApi<'_> {
    pub async fn list(&self) -> crate::Result<Vec<Alert>> {
        let list: AlertList = self.client.get("/alerts").await?;
        Ok(match list {
            AlertList::Wrapped { alerts } => alerts,
            AlertList::Bare(alerts) => alerts,
        })
    }

    /// `PUT /alerts/:id/resolve`, returning the updated alert when the backend echoes it
    pub async fn resolve(&self, id: &str) -> crate::Result<Option<Alert>> {
        let response = self
            .client
            .put_empty(&format!("/alerts/{}/resolve", segment(id)?))
            .await?;
        Ok(serde_json::from_str::<Alert>(&response.body).ok())
    }

    pub async fn delete(&self, id: &str) -> crate::Result<()> {
        self.client.delete(&format!("/alerts/{}", segment(id)?)).await
    }
}
