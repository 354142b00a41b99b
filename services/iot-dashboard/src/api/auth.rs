//! `/auth` endpoints

use crate::api::ApiClient;
use crate::model::{AuthResponse, Credentials, Registration};
use crate::DashboardError;

pub struct AuthApi<'a> {
    client: &'a ApiClient,
}

impl ApiClient {
    pub fn auth(&self) -> AuthApi<'_> {
        AuthApi { client: self }
    }
}

impl AuthApi<'_> {
    /// `POST /auth/login`; rejected credentials map to [`DashboardError::InvalidCredentials`]
    pub async fn login(&self, credentials: &Credentials) -> crate::Result<AuthResponse> {
        match self.client.post("/auth/login", credentials).await {
            Err(e) if matches!(e.status(), Some(400 | 401 | 403)) => {
                tracing::debug!("Login rejected for {}: {}", credentials.email, e);
                Err(DashboardError::InvalidCredentials)
            }
            other => other,
        }
    }

    /// `POST /auth/register`
    pub async fn register(&self, registration: &Registration) -> crate::Result<AuthResponse> {
        let response: Option<AuthResponse> =
            self.client.post("/auth/register", registration).await?;
        Ok(response.unwrap_or_default())
    }
}
