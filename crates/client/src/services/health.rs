use crate::api::ApiClient;
use crate::errors::ApiError;
use crate::types::HealthStatus;

#[derive(Debug, Clone)]
pub struct HealthService {
    api: ApiClient,
}

impl HealthService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn check(&self) -> Result<HealthStatus, ApiError> {
        self.api.get_json("/health").await
    }
}
