//! `itematic-client`: session lifecycle and HTTP access to the backend.
//!
//! [`ClientContext`] is the composition root: it wires the persistent
//! session store, the session manager, the HTTP client and the resource
//! services together. Everything else is reachable from it.

pub mod api;
pub mod auth_backend;
pub mod config;
pub mod errors;
pub mod services;
pub mod session;
pub mod session_store;
pub mod store;
pub mod types;

use std::sync::Arc;

pub use itematic_auth::{
    Action, Authorizer, AuthzError, BranchRef, Capabilities, DEFAULT_LANDING, GuardDecision, RequiredRoles,
    Role, RouteGuard, SessionUser, UserPatch,
};

pub use api::{ApiClient, StaticToken, TokenSource};
pub use auth_backend::{AuthBackend, HttpAuthBackend};
pub use config::{ClientConfig, ConfigError};
pub use errors::{ApiError, ErrorCode, Failure, translate};
pub use session::{AuthSessionManager, SessionError, SessionSnapshot, SessionState, SessionWatch};
pub use session_store::SessionStore;
pub use store::{FileStore, KeyValueStore, MemoryStore, StoreError};

use services::{BranchService, CategoryService, CompanyService, HealthService, ItemService, UserService};

/// Everything a front end needs, built once per process.
#[derive(Debug, Clone)]
pub struct ClientContext {
    pub config: ClientConfig,
    pub session: Arc<AuthSessionManager>,
    pub api: ApiClient,
    pub company: CompanyService,
    pub branches: BranchService,
    pub users: UserService,
    pub items: ItemService,
    pub categories: CategoryService,
    pub health: HealthService,
}

impl ClientContext {
    /// Build the context and restore any persisted session.
    pub fn from_config(config: ClientConfig) -> Result<Self, ApiError> {
        let kv: Arc<dyn KeyValueStore> = match &config.session_file {
            Some(path) => {
                tracing::debug!(path = %path.display(), "using file-backed session store");
                Arc::new(FileStore::open(path))
            }
            None => {
                tracing::debug!("no session file configured; session is kept in memory");
                Arc::new(MemoryStore::new())
            }
        };
        Self::with_store(config, kv)
    }

    /// Build the context over an explicit key/value store.
    pub fn with_store(config: ClientConfig, kv: Arc<dyn KeyValueStore>) -> Result<Self, ApiError> {
        let base = ApiClient::from_config(&config)?;

        let backend = Arc::new(HttpAuthBackend::new(base.clone()));
        let session = Arc::new(AuthSessionManager::new(SessionStore::new(kv), backend));
        session.hydrate();

        let api = base.with_token_source(Arc::new(session.subscribe()));

        Ok(Self {
            company: CompanyService::new(api.clone()),
            branches: BranchService::new(api.clone()),
            users: UserService::new(api.clone()),
            items: ItemService::new(api.clone()),
            categories: CategoryService::new(api.clone()),
            health: HealthService::new(api.clone()),
            api,
            session,
            config,
        })
    }

    /// Guard for a route, using the configured landing path.
    pub fn guard(&self, required: Option<RequiredRoles>) -> RouteGuard {
        let guard = match required {
            Some(roles) => RouteGuard::requiring(roles),
            None => RouteGuard::any_authenticated(),
        };
        guard.with_landing(self.config.landing_path.clone())
    }

    /// Capabilities of whoever is signed in right now.
    pub fn capabilities(&self) -> Capabilities {
        Capabilities::for_user(self.session.user().as_ref())
    }
}
