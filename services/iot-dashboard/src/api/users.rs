//! `/users` endpoints

use crate::api::{segment, ApiClient};
use crate::model::{User, UserUpdate};

pub struct UsersApi<'a> {
    client: &'a ApiClient,
}

impl ApiClient {
    pub fn users(&self) -> UsersApi<'_> {
        UsersApi { client: self }
    }
}

impl UsersApi<'_> {
    pub async fn list(&self) -> crate::Result<Vec<User>> {
        self.client.get("/users").await
    }

    pub async fn get(&self, id: &str) -> crate::Result<User> {
        self.client.get(&format!("/users/{}", segment(id)?)).await
    }

    pub async fn update(&self, id: &str, update: &UserUpdate) -> crate::Result<User> {
        self.client.put(&format!("/users/{}", segment(id)?), update).await
    }

    pub async fn delete(&self, id: &str) -> crate::Result<()> {
        self.client.delete(&format!("/users/{}", segment(id)?)).await
    }
}
