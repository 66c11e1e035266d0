//! Session lifecycle: hydrate, login, logout and profile refresh.
//!
//! [`AuthSessionManager`] is the only writer of the session. Everything else
//! observes it through [`SessionWatch`], a cheap handle over a `watch`
//! channel that also serves as the HTTP client's [`TokenSource`].

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::{Mutex, watch};
use tracing::Instrument;

use itematic_auth::{Authorizer, GuardState, SessionUser, UserPatch};

use crate::api::TokenSource;
use crate::auth_backend::AuthBackend;
use crate::errors::{ApiError, translate};
use crate::session_store::SessionStore;
use crate::store::StoreError;
use crate::types::Credentials;

// ─────────────────────────────────────────────────────────────────────────────
// State
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq)]
pub enum SessionState {
    /// Nothing has been read yet.
    #[default]
    Uninitialized,
    /// Reading the persisted session.
    Hydrating,
    Anonymous,
    /// A credential exchange is in flight.
    LoggingIn,
    Authenticated { token: String, user: SessionUser },
}

/// What observers see: the state plus the last failure, already translated
/// for display.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionSnapshot {
    pub state: SessionState,
    pub last_error: Option<String>,
}

impl SessionSnapshot {
    fn new(state: SessionState) -> Self {
        Self {
            state,
            last_error: None,
        }
    }

    pub fn token(&self) -> Option<&str> {
        match &self.state {
            SessionState::Authenticated { token, .. } => Some(token),
            _ => None,
        }
    }

    pub fn user(&self) -> Option<&SessionUser> {
        match &self.state {
            SessionState::Authenticated { user, .. } => Some(user),
            _ => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self.state, SessionState::Authenticated { .. })
    }

    pub fn is_loading(&self) -> bool {
        matches!(
            self.state,
            SessionState::Uninitialized | SessionState::Hydrating | SessionState::LoggingIn
        )
    }

    pub fn authorizer(&self) -> Authorizer<'_> {
        Authorizer::new(self.user())
    }
}

impl GuardState for SessionSnapshot {
    fn is_loading(&self) -> bool {
        SessionSnapshot::is_loading(self)
    }

    fn is_authenticated(&self) -> bool {
        SessionSnapshot::is_authenticated(self)
    }

    fn user(&self) -> Option<&SessionUser> {
        SessionSnapshot::user(self)
    }
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("failed to persist session: {0}")]
    Store(#[from] StoreError),

    #[error("no authenticated session")]
    NotAuthenticated,
}

impl SessionError {
    /// Display text for the failure.
    pub fn display(&self) -> String {
        match self {
            SessionError::Api(err) => translate(err),
            other => other.to_string(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Watch handle
// ─────────────────────────────────────────────────────────────────────────────

/// Read-only view of the session. Clone freely.
#[derive(Debug, Clone)]
pub struct SessionWatch {
    rx: watch::Receiver<SessionSnapshot>,
}

impl SessionWatch {
    pub fn snapshot(&self) -> SessionSnapshot {
        self.rx.borrow().clone()
    }

    pub fn token(&self) -> Option<String> {
        self.rx.borrow().token().map(str::to_owned)
    }

    pub fn user(&self) -> Option<SessionUser> {
        self.rx.borrow().user().cloned()
    }

    /// Wait for the next published change. Returns `false` once the manager
    /// is gone.
    pub async fn changed(&mut self) -> bool {
        self.rx.changed().await.is_ok()
    }
}

impl TokenSource for SessionWatch {
    fn bearer_token(&self) -> Option<String> {
        self.token()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Manager
// ─────────────────────────────────────────────────────────────────────────────

/// Owner of the session.
///
/// # Invariants
/// - The persisted token and user are written and removed together.
/// - Logins never overlap: a second call waits for the first to finish and
///   then runs its own full sequence. A logout also waits, so it always
///   lands after the login it raced with.
/// - A login that cannot clear the previous session stops before contacting
///   the backend.
pub struct AuthSessionManager {
    store: SessionStore,
    backend: Arc<dyn AuthBackend>,
    tx: watch::Sender<SessionSnapshot>,
    login_lock: Mutex<()>,
}

impl core::fmt::Debug for AuthSessionManager {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AuthSessionManager")
            .field("state", &self.tx.borrow().state)
            .finish_non_exhaustive()
    }
}

impl AuthSessionManager {
    pub fn new(store: SessionStore, backend: Arc<dyn AuthBackend>) -> Self {
        let (tx, _rx) = watch::channel(SessionSnapshot::default());
        Self {
            store,
            backend,
            tx,
            login_lock: Mutex::new(()),
        }
    }

    pub fn subscribe(&self) -> SessionWatch {
        SessionWatch {
            rx: self.tx.subscribe(),
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.tx.borrow().clone()
    }

    pub fn token(&self) -> Option<String> {
        self.tx.borrow().token().map(str::to_owned)
    }

    pub fn user(&self) -> Option<SessionUser> {
        self.tx.borrow().user().cloned()
    }

    pub fn is_authenticated(&self) -> bool {
        self.tx.borrow().is_authenticated()
    }

    fn publish(&self, state: SessionState, last_error: Option<String>) {
        self.tx.send_replace(SessionSnapshot { state, last_error });
    }

    /// Restore the persisted session. Only the first call reads the store;
    /// later calls return the current snapshot. Never touches the network.
    pub fn hydrate(&self) -> SessionSnapshot {
        let started = self.tx.send_if_modified(|snapshot| {
            if snapshot.state == SessionState::Uninitialized {
                snapshot.state = SessionState::Hydrating;
                true
            } else {
                false
            }
        });
        if !started {
            return self.snapshot();
        }

        let state = match self.store.load() {
            Some((token, user)) => {
                tracing::info!(user_id = %user.id, "restored persisted session");
                SessionState::Authenticated { token, user }
            }
            None => {
                if self.store.is_partial() {
                    tracing::warn!("discarding incomplete persisted session");
                    if let Err(err) = self.store.clear() {
                        tracing::warn!(error = %err, "failed to clear incomplete session");
                    }
                }
                SessionState::Anonymous
            }
        };

        self.tx.send_replace(SessionSnapshot::new(state));
        self.snapshot()
    }

    /// Exchange credentials, fetch the profile and persist the session.
    ///
    /// Any existing session is cleared first. On failure the session is left
    /// anonymous and the backend error is returned unchanged.
    pub async fn login(&self, username: &str, password: &str) -> Result<SessionUser, SessionError> {
        let _serialized = self.login_lock.lock().await;
        let span = tracing::info_span!("login", username);

        async {
            self.publish(SessionState::LoggingIn, None);
            if let Err(err) = self.store.clear() {
                tracing::error!(error = %err, "failed to clear previous session");
                let err = SessionError::from(err);
                self.publish(SessionState::Anonymous, Some(err.display()));
                return Err(err);
            }

            let credentials = Credentials::new(username, password);
            match self.authenticate(&credentials).await {
                Ok((token, user)) => {
                    if let Err(err) = self.store.persist(&token, &user) {
                        tracing::error!(error = %err, "failed to persist session");
                        let err = SessionError::from(err);
                        self.publish(SessionState::Anonymous, Some(err.display()));
                        return Err(err);
                    }
                    tracing::info!(user_id = %user.id, role = ?user.role.as_ref().map(|r| r.as_str()), "login succeeded");
                    self.publish(
                        SessionState::Authenticated {
                            token,
                            user: user.clone(),
                        },
                        None,
                    );
                    Ok(user)
                }
                Err(err) => {
                    tracing::info!(error = %err, "login failed");
                    self.publish(SessionState::Anonymous, Some(translate(&err)));
                    Err(SessionError::Api(err))
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn authenticate(&self, credentials: &Credentials) -> Result<(String, SessionUser), ApiError> {
        let grant = self.backend.exchange_credentials(credentials).await?;
        let user = self.backend.fetch_profile(&grant.access_token).await?;
        Ok((grant.access_token, user.normalized()))
    }

    /// Drop the session from memory and storage. Always succeeds.
    ///
    /// Waits for an in-flight login to finish, so the logout is never
    /// overwritten by it.
    pub async fn logout(&self) {
        let _serialized = self.login_lock.lock().await;
        if let Err(err) = self.store.clear() {
            tracing::warn!(error = %err, "failed to clear persisted session");
        }
        self.publish(SessionState::Anonymous, None);
        tracing::info!("logged out");
    }

    /// Merge `patch` into the signed-in user and persist the result.
    pub fn update_user(&self, patch: UserPatch) -> Result<SessionUser, SessionError> {
        let snapshot = self.snapshot();
        let SessionState::Authenticated { token, mut user } = snapshot.state else {
            return Err(SessionError::NotAuthenticated);
        };

        user.apply(patch);
        let user = user.normalized();
        self.store.persist(&token, &user)?;

        tracing::debug!(user_id = %user.id, "session user updated");
        self.publish(
            SessionState::Authenticated {
                token,
                user: user.clone(),
            },
            None,
        );
        Ok(user)
    }
}

impl TokenSource for AuthSessionManager {
    fn bearer_token(&self) -> Option<String> {
        self.token()
    }
}
