//! Login and registration

use serde::Deserialize;

use crate::api::ApiClient;
use crate::model::{Credentials, Registration};
use crate::pages::SubmitOutcome;
use crate::session::SessionContext;
use crate::DashboardError;

pub const REGISTERED_ROUTE: &str = "/login?registered=1";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginQuery {
    #[serde(default)]
    pub registered: Option<String>,
}

/// Why a sign-in attempt was turned away
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginFailure {
    /// The backend rejected the email/password pair
    Credentials,
    /// The form itself was unusable
    Input,
    /// The backend could not be reached or answered unexpectedly
    Backend,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoginPage {
    pub email: String,
    pub error: Option<String>,
    pub notice: Option<String>,
    pub failure: Option<LoginFailure>,
}

impl LoginPage {
    pub fn new(query: &LoginQuery) -> Self {
        Self {
            notice: query
                .registered
                .as_ref()
                .map(|_| "Registration successful. Please sign in.".to_string()),
            ..Self::default()
        }
    }

    /// Authenticate; the password is never echoed back into the form
    pub async fn submit(
        api: &ApiClient,
        credentials: Credentials,
    ) -> Result<SessionContext, LoginPage> {
        SessionContext::login(api, &credentials)
            .await
            .map_err(|e| {
                let (failure, error) = match e {
                    DashboardError::InvalidCredentials => (
                        LoginFailure::Credentials,
                        DashboardError::InvalidCredentials.to_string(),
                    ),
                    DashboardError::Validation(message) => (LoginFailure::Input, message),
                    other => {
                        tracing::warn!("Login failed: {}", other);
                        (LoginFailure::Backend, "Login failed. Please try again.".to_string())
                    }
                };
                LoginPage {
                    email: credentials.email.clone(),
                    error: Some(error),
                    notice: None,
                    failure: Some(failure),
                }
            })
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegisterPage {
    pub username: String,
    pub email: String,
    pub error: Option<String>,
}

impl RegisterPage {
    pub async fn submit(api: &ApiClient, registration: Registration) -> SubmitOutcome<Self> {
        let result = if registration.username.trim().is_empty()
            || registration.email.trim().is_empty()
            || registration.password.is_empty()
        {
            Err(DashboardError::Validation("All fields are required".to_string()))
        } else {
            api.auth().register(&registration).await
        };

        match result {
            Ok(_) => {
                tracing::info!("Registered {}", registration.email);
                SubmitOutcome::Navigate(REGISTERED_ROUTE.to_string())
            }
            Err(e) => {
                let error = match e {
                    DashboardError::Validation(message) => message,
                    DashboardError::Status { status: 400 | 409, message } if !message.is_empty() => message,
                    other => {
                        tracing::warn!("Registration failed: {}", other);
                        "Registration failed. Please try again.".to_string()
                    }
                };
                SubmitOutcome::Rerender(Self {
                    username: registration.username,
                    email: registration.email,
                    error: Some(error),
                })
            }
        }
    }
}
