//! Credential exchange and profile lookup.

use itematic_auth::SessionUser;

use crate::api::ApiClient;
use crate::errors::ApiError;
use crate::types::{Credentials, TokenGrant};

pub const LOGIN_PATH: &str = "/auth/login";
pub const PROFILE_PATH: &str = "/auth/me";

/// Identity endpoints used by the session manager.
#[async_trait::async_trait]
pub trait AuthBackend: Send + Sync {
    /// Trade a username/password pair for a bearer token.
    async fn exchange_credentials(&self, credentials: &Credentials) -> Result<TokenGrant, ApiError>;

    /// Fetch the profile of the holder of `token`.
    async fn fetch_profile(&self, token: &str) -> Result<SessionUser, ApiError>;
}

/// [`AuthBackend`] over the REST API.
///
/// The client it wraps should carry no token source: the exchange is sent
/// anonymously and the profile lookup carries the freshly issued token.
#[derive(Debug, Clone)]
pub struct HttpAuthBackend {
    api: ApiClient,
}

impl HttpAuthBackend {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

#[async_trait::async_trait]
impl AuthBackend for HttpAuthBackend {
    async fn exchange_credentials(&self, credentials: &Credentials) -> Result<TokenGrant, ApiError> {
        self.api.post_json_anonymous(LOGIN_PATH, credentials).await
    }

    async fn fetch_profile(&self, token: &str) -> Result<SessionUser, ApiError> {
        self.api.get_json_with_token(PROFILE_PATH, token).await
    }
}
