//! Admin user management
//!
//! Selection, edit mode and the pending delete confirmation travel in the
//! query string so every step is a plain navigation.

use serde::{Deserialize, Serialize};

use crate::api::ApiClient;
use crate::load_state::LoadState;
use crate::model::{Role, User, UserUpdate};
use crate::session::Session;
use crate::DashboardError;

pub const LOAD_FAILED: &str = "Failed to load data. Please try again later.";
pub const UPDATE_FAILED: &str = "Failed to update user. Please try again.";
pub const DELETE_FAILED: &str = "Failed to delete user. Please try again.";
pub const SELF_DELETE: &str = "You cannot delete your own account.";

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AdminQuery {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub selected: Option<String>,
    #[serde(default)]
    pub edit: Option<bool>,
    #[serde(default)]
    pub confirm_delete: Option<String>,
    #[serde(default)]
    pub notice: Option<String>,
}

/// Posted by the user edit form
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub role: String,
}

impl UserForm {
    pub fn from_user(user: &User) -> Self {
        Self {
            username: user.username.clone(),
            email: user.email.clone(),
            role: user.role.to_string(),
        }
    }

    pub fn to_update(&self) -> crate::Result<UserUpdate> {
        if self.username.trim().is_empty() || self.email.trim().is_empty() {
            return Err(DashboardError::Validation(
                "Username and email are required".to_string(),
            ));
        }
        Ok(UserUpdate {
            username: self.username.clone(),
            email: self.email.clone(),
            role: Some(self.role.parse::<Role>()?),
        })
    }
}

/// Case-insensitive match on username or email; an empty term matches all
pub fn filter_users<'a>(users: &'a [User], term: &str) -> Vec<&'a User> {
    let term = term.trim().to_lowercase();
    users
        .iter()
        .filter(|u| {
            term.is_empty()
                || u.username.to_lowercase().contains(&term)
                || u.email.to_lowercase().contains(&term)
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct UserManagement {
    pub users: Vec<User>,
    pub profile: Option<User>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    ConfirmationRequired,
    Deleted,
    Refused,
    Failed,
}

#[derive(Debug, Clone)]
pub struct AdminPage {
    pub data: LoadState<UserManagement>,
    pub admin_id: Option<String>,
    pub search: String,
    pub selected: Option<String>,
    pub editing: bool,
    pub form: Option<UserForm>,
    pub confirm_delete: Option<String>,
    pub error: Option<String>,
    pub success: Option<String>,
}

impl AdminPage {
    /// Fetch every user and the admin's own record concurrently
    pub async fn load(api: &ApiClient, session: &Session, query: AdminQuery) -> Self {
        let users = api.users();
        let data = LoadState::load(
            async {
                let own = async {
                    match session.id.as_deref() {
                        Some(id) => users.get(id).await.map(Some),
                        None => Ok(None),
                    }
                };
                let (users, profile) = tokio::try_join!(users.list(), own)?;
                Ok(UserManagement { users, profile })
            },
            LOAD_FAILED,
        )
        .await;

        let mut page = Self {
            data,
            admin_id: session.id.clone(),
            search: query.search.unwrap_or_default(),
            selected: None,
            editing: query.edit.unwrap_or(false),
            form: None,
            confirm_delete: query.confirm_delete,
            error: None,
            success: query.notice,
        };
        if let Some(id) = query.selected {
            page.select(&id);
        }
        page
    }

    /// Select a user and reset the form to its record
    pub fn select(&mut self, id: &str) {
        let form = self.user(id).map(UserForm::from_user);
        match form {
            Some(form) => {
                self.selected = Some(id.to_string());
                self.form = Some(form);
            }
            None => {
                self.selected = None;
                self.form = None;
                self.editing = false;
            }
        }
    }

    pub fn user(&self, id: &str) -> Option<&User> {
        self.data.ready()?.users.iter().find(|u| u.id == id)
    }

    pub fn selected_user(&self) -> Option<&User> {
        self.selected.as_deref().and_then(|id| self.user(id))
    }

    pub fn visible_users(&self) -> Vec<&User> {
        self.data
            .ready()
            .map(|data| filter_users(&data.users, &self.search))
            .unwrap_or_default()
    }

    pub fn is_self(&self, id: &str) -> bool {
        self.admin_id.as_deref() == Some(id)
    }

    /// Apply an edit; on success the user is replaced in the loaded list
    pub async fn update_user(&mut self, api: &ApiClient, id: &str, form: UserForm) -> bool {
        self.select(id);
        let result = match form.to_update() {
            Ok(update) => api.users().update(id, &update).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(updated) => {
                tracing::info!("Admin updated user {}", id);
                let own = self.is_self(id);
                if let Some(data) = self.data.ready_mut() {
                    if let Some(slot) = data.users.iter_mut().find(|u| u.id == id) {
                        *slot = updated.clone();
                    }
                    if own {
                        data.profile = Some(updated);
                    }
                }
                self.select(id);
                self.editing = false;
                self.error = None;
                self.success = Some("User updated successfully!".to_string());
                true
            }
            Err(e) => {
                tracing::warn!("Failed to update user {}: {}", id, e);
                self.editing = true;
                self.form = Some(form);
                self.success = None;
                self.error = Some(match e {
                    DashboardError::Validation(message) => message,
                    _ => UPDATE_FAILED.to_string(),
                });
                false
            }
        }
    }

    /// Two-step delete: the first request only arms the confirmation
    pub async fn delete_user(&mut self, api: &ApiClient, id: &str, confirmed: bool) -> DeleteOutcome {
        if self.is_self(id) {
            self.error = Some(SELF_DELETE.to_string());
            self.confirm_delete = None;
            return DeleteOutcome::Refused;
        }
        if !confirmed {
            self.confirm_delete = Some(id.to_string());
            return DeleteOutcome::ConfirmationRequired;
        }

        match api.users().delete(id).await {
            Ok(()) => {
                tracing::info!("Admin deleted user {}", id);
                if let Some(data) = self.data.ready_mut() {
                    data.users.retain(|u| u.id != id);
                }
                if self.selected.as_deref() == Some(id) {
                    self.selected = None;
                    self.form = None;
                    self.editing = false;
                }
                self.confirm_delete = None;
                self.error = None;
                self.success = Some("User deleted successfully!".to_string());
                DeleteOutcome::Deleted
            }
            Err(e) => {
                tracing::warn!("Failed to delete user {}: {}", id, e);
                self.success = None;
                self.error = Some(DELETE_FAILED.to_string());
                DeleteOutcome::Failed
            }
        }
    }
}
