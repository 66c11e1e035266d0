use itematic_core::UserId;

use crate::api::ApiClient;
use crate::errors::ApiError;
use crate::types::{AdminUserUpdate, NewUser, UserAccount, UserUpdate};

#[derive(Debug, Clone)]
pub struct UserService {
    api: ApiClient,
}

impl UserService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn list(&self) -> Result<Vec<UserAccount>, ApiError> {
        self.api.get_json("/users").await
    }

    pub async fn get(&self, id: UserId) -> Result<UserAccount, ApiError> {
        self.api.get_json(&format!("/users/{id}")).await
    }

    pub async fn create(&self, user: &NewUser) -> Result<UserAccount, ApiError> {
        self.api.post_json("/users", user).await
    }

    /// Update one's own profile.
    pub async fn update(&self, id: UserId, update: &UserUpdate) -> Result<UserAccount, ApiError> {
        self.api.put_json(&format!("/users/{id}"), update).await
    }

    /// Administrative update of role, scope and activation.
    pub async fn admin_update(&self, id: UserId, update: &AdminUserUpdate) -> Result<UserAccount, ApiError> {
        self.api.put_json(&format!("/users/{id}/admin"), update).await
    }

    pub async fn delete(&self, id: UserId) -> Result<(), ApiError> {
        self.api.delete(&format!("/users/{id}")).await
    }
}
