//! `/readings` endpoints

use crate::api::ApiClient;
use crate::model::{NewReading, Reading};

pub struct ReadingsApi<'a> {
    client: &'a ApiClient,
}

impl ApiClient {
    pub fn readings(&self) -> ReadingsApi<'_> {
        ReadingsApi { client: self }
    }
}

impl ReadingsApi<'_> {
    pub async fn list(&self) -> crate::Result<Vec<Reading>> {
        self.client.get("/readings").await
    }

    pub async fn create(&self, reading: &NewReading) -> crate::Result<Reading> {
        self.client.post("/readings", reading).await
    }
}
