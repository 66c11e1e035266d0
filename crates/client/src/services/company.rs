use crate::api::ApiClient;
use crate::errors::ApiError;
use crate::types::{Company, CompanyRegistration};

#[derive(Debug, Clone)]
pub struct CompanyService {
    api: ApiClient,
}

impl CompanyService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// The signed-in user's company.
    pub async fn current(&self) -> Result<Company, ApiError> {
        self.api.get_json("/company").await
    }

    /// Create a company together with its first administrator. Sent without
    /// credentials.
    pub async fn register(&self, registration: &CompanyRegistration) -> Result<Company, ApiError> {
        tracing::info!(company = %registration.company.name, "registering company");
        self.api
            .post_json_anonymous("/companies/register", registration)
            .await
    }
}
