//! `/devices` endpoints

use crate::api::{segment, ApiClient};
use crate::model::{Alert, Device, DeviceDraft, DeviceUpdate, Reading};

pub struct DevicesApi<'a> {
    client: &'a ApiClient,
}

impl ApiClient {
    pub fn devices(&self) -> DevicesApi<'_> {
        DevicesApi { client: self }
    }
}

impl DevicesApi<'_> {
    pub async fn list(&self) -> crate::Result<Vec<Device>> {
        self.client.get("/devices").await
    }

    pub async fn get(&self, id: &str) -> crate::Result<Device> {
        self.client.get(&format!("/devices/{}", segment(id)?)).await
    }

    pub async fn create(&self, draft: &DeviceDraft) -> crate::Result<Device> {
        self.client.post("/devices", draft).await
    }

    pub async fn update(&self, id: &str, update: &DeviceUpdate) -> crate::Result<Device> {
        self.client.put(&format!("/devices/{}", segment(id)?), update).await
    }

    pub async fn delete(&self, id: &str) -> crate::Result<()> {
        self.client.delete(&format!("/devices/{}", segment(id)?)).await
    }

    pub async fn readings(&self, id: &str) -> crate::Result<Vec<Reading>> {
        self.client.get(&format!("/devices/{}/readings", segment(id)?)).await
    }

    pub async fn alerts(&self, id: &str) -> crate::Result<Vec<Alert>> {
        self.client.get(&format!("/devices/{}/alerts", segment(id)?)).await
    }
}
