//! HTTP client for the REST backend.
//!
//! Every request consults the configured [`TokenSource`] and carries the
//! current bearer token when one is available, so a login or logout is
//! reflected on the very next request without re-building the client.

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use reqwest::{Method, RequestBuilder, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::Instrument;
use uuid::Uuid;

use crate::config::ClientConfig;
use crate::errors::{ApiError, ErrorPayload};

pub const REQUEST_ID_HEADER: &str = "X-Request-Id";

/// Getter for the bearer token attached to outgoing requests.
pub trait TokenSource: Send + Sync {
    fn bearer_token(&self) -> Option<String>;
}

/// Fixed token, for scripts and tests.
#[derive(Debug, Clone)]
pub struct StaticToken(pub String);

impl TokenSource for StaticToken {
    fn bearer_token(&self) -> Option<String> {
        Some(self.0.clone())
    }
}

/// How a single request authenticates.
#[derive(Debug, Clone, Copy)]
enum Auth<'a> {
    /// Use the token source, if any.
    Session,
    /// Use this token regardless of the session.
    Bearer(&'a str),
    /// Send no credentials.
    Anonymous,
}

/// Thin JSON client over `reqwest`. Cheap to clone.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    tokens: Option<Arc<dyn TokenSource>>,
}

impl core::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("has_token_source", &self.tokens.is_some())
            .finish()
    }
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ApiError> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(ApiError::InvalidUrl("empty base URL".to_string()));
        }

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| ApiError::Setup(e.to_string()))?;

        Ok(Self {
            http,
            base_url,
            tokens: None,
        })
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self, ApiError> {
        Self::new(config.api_base_url.clone(), config.request_timeout())
    }

    /// Attach a token source consulted on every request.
    pub fn with_token_source(mut self, tokens: Arc<dyn TokenSource>) -> Self {
        self.tokens = Some(tokens);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    fn request(&self, method: Method, path: &str, auth: Auth<'_>) -> RequestBuilder {
        let builder = self.http.request(method, self.url(path));
        let token = match auth {
            Auth::Session => self.tokens.as_ref().and_then(|t| t.bearer_token()),
            Auth::Bearer(token) => Some(token.to_string()),
            Auth::Anonymous => None,
        };
        match token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send(&self, method: Method, path: &str, builder: RequestBuilder) -> Result<Response, ApiError> {
        let request_id = Uuid::now_v7();
        let span = tracing::debug_span!("api_request", %method, path, %request_id);

        async move {
            let response = builder
                .header(REQUEST_ID_HEADER, request_id.to_string())
                .send()
                .await
                .map_err(|e| {
                    tracing::warn!(error = %e, "request failed before a response");
                    if e.is_builder() {
                        ApiError::InvalidUrl(e.to_string())
                    } else {
                        ApiError::Network(e.to_string())
                    }
                })?;

            let status = response.status();
            if status.is_success() {
                tracing::debug!(status = status.as_u16(), "request succeeded");
                return Ok(response);
            }

            let body = response.text().await.unwrap_or_default();
            tracing::debug!(status = status.as_u16(), "backend returned an error");
            Err(ApiError::Backend {
                status: status.as_u16(),
                payload: ErrorPayload::from_body(&body),
            })
        }
        .instrument(span)
        .await
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }

    async fn json_call<B, T>(&self, method: Method, path: &str, body: Option<&B>, auth: Auth<'_>) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let mut builder = self.request(method.clone(), path, auth);
        if let Some(body) = body {
            builder = builder.json(body);
        }
        let response = self.send(method, path, builder).await?;
        Self::decode(response).await
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.json_call::<(), T>(Method::GET, path, None, Auth::Session).await
    }

    /// GET with an explicit bearer token, bypassing the token source.
    pub async fn get_json_with_token<T: DeserializeOwned>(&self, path: &str, token: &str) -> Result<T, ApiError> {
        self.json_call::<(), T>(Method::GET, path, None, Auth::Bearer(token)).await
    }

    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.json_call(Method::POST, path, Some(body), Auth::Session).await
    }

    /// POST without any credentials (registration, credential exchange).
    pub async fn post_json_anonymous<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.json_call(Method::POST, path, Some(body), Auth::Anonymous).await
    }

    pub async fn put_json<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.json_call(Method::PUT, path, Some(body), Auth::Session).await
    }

    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        let builder = self.request(Method::DELETE, path, Auth::Session);
        self.send(Method::DELETE, path, builder).await?;
        Ok(())
    }

    pub async fn post_multipart<T: DeserializeOwned>(
        &self,
        path: &str,
        form: reqwest::multipart::Form,
    ) -> Result<T, ApiError> {
        let builder = self.request(Method::POST, path, Auth::Session).multipart(form);
        let response = self.send(Method::POST, path, builder).await?;
        Self::decode(response).await
    }

    pub async fn put_multipart<T: DeserializeOwned>(
        &self,
        path: &str,
        form: reqwest::multipart::Form,
    ) -> Result<T, ApiError> {
        let builder = self.request(Method::PUT, path, Auth::Session).multipart(form);
        let response = self.send(Method::PUT, path, builder).await?;
        Self::decode(response).await
    }

    /// Raw response body (images and other binary resources).
    pub async fn get_bytes(&self, path: &str) -> Result<Vec<u8>, ApiError> {
        let builder = self.request(Method::GET, path, Auth::Session);
        let response = self.send(Method::GET, path, builder).await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))?;
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> ApiClient {
        ApiClient::new(base, Duration::from_secs(1)).unwrap()
    }

    #[test]
    fn url_joins_with_single_slash() {
        let api = client("http://localhost:8000/api/v1/");
        assert_eq!(api.url("/branches"), "http://localhost:8000/api/v1/branches");
        assert_eq!(api.url("branches/3"), "http://localhost:8000/api/v1/branches/3");
    }

    #[test]
    fn empty_base_url_is_rejected() {
        assert!(matches!(
            ApiClient::new("/", Duration::from_secs(1)),
            Err(ApiError::InvalidUrl(_))
        ));
    }

    #[test]
    fn static_token_always_answers() {
        assert_eq!(StaticToken("t".to_string()).bearer_token().as_deref(), Some("t"));
    }
}
