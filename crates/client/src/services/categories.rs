use itematic_core::{CategoryId, ItemId};

use crate::api::ApiClient;
use crate::errors::ApiError;
use crate::types::{Category, CategoryInput};

#[derive(Debug, Clone)]
pub struct CategoryService {
    api: ApiClient,
}

impl CategoryService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn list(&self) -> Result<Vec<Category>, ApiError> {
        self.api.get_json("/categories").await
    }

    pub async fn get(&self, id: CategoryId) -> Result<Category, ApiError> {
        self.api.get_json(&format!("/categories/{id}")).await
    }

    pub async fn create(&self, input: &CategoryInput) -> Result<Category, ApiError> {
        self.api.post_json("/categories", input).await
    }

    pub async fn update(&self, id: CategoryId, input: &CategoryInput) -> Result<Category, ApiError> {
        self.api.put_json(&format!("/categories/{id}"), input).await
    }

    pub async fn delete(&self, id: CategoryId) -> Result<(), ApiError> {
        self.api.delete(&format!("/categories/{id}")).await
    }

    /// Replace the categories attached to an item. The acknowledgement body
    /// is returned as-is.
    pub async fn assign_to_item(&self, item: ItemId, categories: &[CategoryId]) -> Result<serde_json::Value, ApiError> {
        self.api
            .post_json(&format!("/items/{item}/categories"), categories)
            .await
    }

    pub async fn for_item(&self, item: ItemId) -> Result<Vec<Category>, ApiError> {
        self.api.get_json(&format!("/items/{item}/categories")).await
    }
}
