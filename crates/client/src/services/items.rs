use itematic_core::ItemId;

use crate::api::ApiClient;
use crate::errors::ApiError;
use crate::types::{Item, ItemForm};

#[derive(Debug, Clone)]
pub struct ItemService {
    api: ApiClient,
}

impl ItemService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn get(&self, id: ItemId) -> Result<Item, ApiError> {
        self.api.get_json(&format!("/items/{id}")).await
    }

    pub async fn create(&self, form: ItemForm) -> Result<Item, ApiError> {
        let form = ItemForm {
            is_active: None,
            ..form
        };
        self.api.post_multipart("/items", form.into_multipart()?).await
    }

    pub async fn update(&self, id: ItemId, form: ItemForm) -> Result<Item, ApiError> {
        self.api
            .put_multipart(&format!("/items/{id}"), form.into_multipart()?)
            .await
    }

    pub async fn delete(&self, id: ItemId) -> Result<(), ApiError> {
        self.api.delete(&format!("/items/{id}")).await
    }

    /// Raw bytes of the item's picture.
    pub async fn image(&self, id: ItemId) -> Result<Vec<u8>, ApiError> {
        self.api.get_bytes(&format!("/items/{id}/image")).await
    }
}
