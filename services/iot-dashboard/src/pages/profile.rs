//! Signed-in user's own profile

use serde::{Deserialize, Serialize};

use crate::api::ApiClient;
use crate::load_state::LoadState;
use crate::model::{User, UserUpdate};
use crate::session::Session;
use crate::DashboardError;

pub const LOAD_FAILED: &str = "Failed to load user profile. Please try again later.";
pub const UPDATE_FAILED: &str = "Failed to update profile. Please try again.";
pub const UPDATED: &str = "Profile updated successfully!";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileQuery {
    #[serde(default)]
    pub edit: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
}

impl ProfileForm {
    pub fn from_user(user: &User) -> Self {
        Self {
            username: user.username.clone(),
            email: user.email.clone(),
        }
    }

    fn validate(&self) -> crate::Result<UserUpdate> {
        if self.username.trim().is_empty() || self.email.trim().is_empty() {
            return Err(DashboardError::Validation(
                "Username and email are required".to_string(),
            ));
        }
        Ok(UserUpdate {
            username: self.username.clone(),
            email: self.email.clone(),
            role: None,
        })
    }
}

#[derive(Debug, Clone)]
pub struct ProfilePage {
    pub user: LoadState<User>,
    pub editing: bool,
    pub form: ProfileForm,
    pub error: Option<String>,
    pub success: Option<String>,
}

fn session_user_id(session: &Session) -> crate::Result<&str> {
    session
        .id
        .as_deref()
        .ok_or_else(|| DashboardError::Validation("Session carries no user id".to_string()))
}

impl ProfilePage {
    pub async fn load(api: &ApiClient, session: &Session, editing: bool) -> Self {
        let user = LoadState::load(
            async {
                let id = session_user_id(session)?;
                api.users().get(id).await
            },
            LOAD_FAILED,
        )
        .await;
        let form = user.ready().map(ProfileForm::from_user).unwrap_or_default();

        Self {
            user,
            editing,
            form,
            error: None,
            success: None,
        }
    }

    /// Save the edited fields; the page stays in edit mode on failure
    pub async fn submit(api: &ApiClient, session: &Session, form: ProfileForm) -> Self {
        let result = async {
            let id = session_user_id(session)?;
            let update = form.validate()?;
            api.users().update(id, &update).await
        }
        .await;

        match result {
            Ok(user) => {
                tracing::info!("Updated profile of {}", user.id);
                Self {
                    form: ProfileForm::from_user(&user),
                    user: LoadState::Ready(user),
                    editing: false,
                    error: None,
                    success: Some(UPDATED.to_string()),
                }
            }
            Err(e) => {
                tracing::warn!("Profile update failed: {}", e);
                let error = match &e {
                    DashboardError::Validation(message) => message.clone(),
                    _ => UPDATE_FAILED.to_string(),
                };
                let mut page = Self::load(api, session, true).await;
                page.form = form;
                page.error = Some(error);
                page
            }
        }
    }
}
