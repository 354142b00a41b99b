//! Device list and device detail

use crate::api::ApiClient;
use crate::guard::{allows, Capability};
use crate::load_state::LoadState;
use crate::model::Device;
use crate::session::Session;

#[derive(Debug, Clone)]
pub struct DeviceListPage {
    pub devices: LoadState<Vec<Device>>,
    pub can_manage: bool,
}

impl DeviceListPage {
    pub async fn load(api: &ApiClient, session: &Session) -> Self {
        Self {
            devices: LoadState::load(api.devices().list(), "Failed to fetch devices").await,
            can_manage: allows(session, Capability::Admin),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DeviceDetailPage {
    pub device: LoadState<Device>,
    pub can_edit: bool,
}

impl DeviceDetailPage {
    pub async fn load(api: &ApiClient, session: &Session, id: &str) -> Self {
        let mut device = LoadState::Idle;
        device.begin();
        match api.devices().get(id).await {
            Err(e) if e.is_not_found() => {
                tracing::debug!("Device {} not found", id);
                device = LoadState::Failed("Device not found".to_string());
            }
            result => device.settle(result, "Failed to fetch device details"),
        }

        Self {
            device,
            can_edit: allows(session, Capability::Admin),
        }
    }
}
