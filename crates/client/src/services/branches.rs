use itematic_core::BranchId;

use crate::api::ApiClient;
use crate::errors::ApiError;
use crate::types::{Branch, BranchInput};

#[derive(Debug, Clone)]
pub struct BranchService {
    api: ApiClient,
}

impl BranchService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn list(&self) -> Result<Vec<Branch>, ApiError> {
        self.api.get_json("/branches").await
    }

    pub async fn get(&self, id: BranchId) -> Result<Branch, ApiError> {
        self.api.get_json(&format!("/branches/{id}")).await
    }

    pub async fn create(&self, input: &BranchInput) -> Result<Branch, ApiError> {
        self.api.post_json("/branches", input).await
    }

    pub async fn update(&self, id: BranchId, input: &BranchInput) -> Result<Branch, ApiError> {
        self.api.put_json(&format!("/branches/{id}"), input).await
    }

    pub async fn delete(&self, id: BranchId) -> Result<(), ApiError> {
        self.api.delete(&format!("/branches/{id}")).await
    }
}
