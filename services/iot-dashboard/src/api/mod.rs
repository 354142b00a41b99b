//! REST backend client
//!
//! [`ApiClient`] owns the shared configuration (base URL, bearer token) and
//! turns non-2xx responses into [`DashboardError::Status`]. The per-resource
//! handles in the submodules map one endpoint to one method.

pub mod alerts;
pub mod auth;
pub mod devices;
pub mod readings;
pub mod users;

use std::sync::Arc;

use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::io::{HttpClient, HttpRequest, HttpResponse};
use crate::DashboardError;

/// Client for the REST backend, optionally carrying a session token
#[derive(Clone)]
pub struct ApiClient {
    http: Arc<dyn HttpClient>,
    base_url: String,
    token: Option<String>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("authenticated", &self.token.is_some())
            .finish()
    }
}

impl ApiClient {
    pub fn new(http: Arc<dyn HttpClient>, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        tracing::debug!("Created ApiClient for {}", base_url);
        Self {
            http,
            base_url,
            token: None,
        }
    }

    /// A client sharing this configuration that sends the given bearer token
    pub fn with_token(&self, token: Option<&str>) -> Self {
        Self {
            http: Arc::clone(&self.http),
            base_url: self.base_url.clone(),
            token: token.map(str::to_string),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn execute(
        &self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> crate::Result<HttpResponse> {
        let mut request = HttpRequest::new(method, self.url(path)).bearer(self.token.clone());
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = self.http.send(request).await?;
        if !response.is_success() {
            tracing::debug!("{} answered with status {}", path, response.status);
            return Err(DashboardError::Status {
                status: response.status,
                message: error_message(&response.body),
            });
        }
        Ok(response)
    }

    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str) -> crate::Result<T> {
        let response = self.execute(Method::GET, path, None).await?;
        decode(&response.body)
    }

    pub(crate) async fn post<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> crate::Result<T> {
        let body = serde_json::to_value(body)?;
        let response = self.execute(Method::POST, path, Some(body)).await?;
        decode(&response.body)
    }

    pub(crate) async fn put<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> crate::Result<T> {
        let body = serde_json::to_value(body)?;
        let response = self.execute(Method::PUT, path, Some(body)).await?;
        decode(&response.body)
    }

    /// PUT without a request body, returning the raw response
    pub(crate) async fn put_empty(&self, path: &str) -> crate::Result<HttpResponse> {
        self.execute(Method::PUT, path, None).await
    }

    pub(crate) async fn delete(&self, path: &str) -> crate::Result<()> {
        self.execute(Method::DELETE, path, None).await?;
        Ok(())
    }
}

/// Percent-encode an id for use as a single path segment.
///
/// Everything outside the RFC 3986 unreserved set is escaped, so an id can
/// never add segments or a query. Dot segments would still be resolved by
/// the URL parser, so they are refused along with the empty id.
pub(crate) fn segment(id: &str) -> crate::Result<String> {
    if id.is_empty() || id == "." || id == ".." {
        return Err(DashboardError::Validation(format!("invalid id '{}'", id)));
    }
    let mut encoded = String::with_capacity(id.len());
    for byte in id.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => {
                encoded.push(char::from(byte))
            }
            _ => encoded.push_str(&format!("%{:02X}", byte)),
        }
    }
    Ok(encoded)
}

/// Decode a JSON body; an empty body decodes as `null`
fn decode<T: DeserializeOwned>(body: &str) -> crate::Result<T> {
    if body.trim().is_empty() {
        return Ok(serde_json::from_value(serde_json::Value::Null)?);
    }
    Ok(serde_json::from_str(body)?)
}

/// Pull a readable message out of an error body
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            ["message", "error"]
                .iter()
                .find_map(|key| v.get(key).and_then(|m| m.as_str()).map(str::to_string))
        })
        .unwrap_or_else(|| body.trim().to_string())
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::io::MockHttpClient;

    pub const BASE: &str = "http://backend.test/api";

    pub fn json_response(status: u16, body: serde_json::Value) -> HttpResponse {
        HttpResponse {
            status,
            body: body.to_string(),
        }
    }

    pub fn client(mock: MockHttpClient) -> ApiClient {
        ApiClient::new(Arc::new(mock), BASE).with_token(Some("test-token"))
    }

    pub fn device_json(id: &str, status: &str) -> serde_json::Value {
        serde_json::json!({
            "id": id,
            "deviceId": format!("sensor-{}", id),
            "name": format!("Device {}", id),
            "location": "Lab",
            "status": status,
            "lastSeen": "2024-05-01T12:00:00Z",
            "settings": {
                "temperatureThreshold": {"min": 18, "max": 25},
                "humidityThreshold": {"min": 40, "max": 60}
            }
        })
    }

    pub fn alert_json(id: &str, resolved: bool) -> serde_json::Value {
        serde_json::json!({
            "id": id,
            "deviceId": "sensor-1",
            "type": "temperature",
            "message": format!("Alert {}", id),
            "timestamp": "2024-05-01T12:00:00Z",
            "resolved": resolved
        })
    }
}
