//! Persistent session: bearer token plus normalized user record.

use std::sync::Arc;

use itematic_auth::SessionUser;

use crate::store::{KeyValueStore, StoreError};

pub const TOKEN_KEY: &str = "token";
pub const USER_KEY: &str = "user";

/// Typed view over the two session keys of a [`KeyValueStore`].
#[derive(Clone)]
pub struct SessionStore {
    kv: Arc<dyn KeyValueStore>,
}

impl core::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SessionStore").finish_non_exhaustive()
    }
}

impl SessionStore {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv }
    }

    pub fn token(&self) -> Option<String> {
        self.kv.get(TOKEN_KEY).filter(|t| !t.is_empty())
    }

    /// The stored user, or `None` when absent or unreadable.
    pub fn user(&self) -> Option<SessionUser> {
        let raw = self.kv.get(USER_KEY)?;
        match serde_json::from_str::<SessionUser>(&raw) {
            Ok(user) => Some(user.normalized()),
            Err(err) => {
                tracing::warn!(error = %err, "ignoring malformed stored user");
                None
            }
        }
    }

    /// Both halves of the session, only when both are present and readable.
    pub fn load(&self) -> Option<(String, SessionUser)> {
        Some((self.token()?, self.user()?))
    }

    /// `true` when exactly one of the two keys is readable.
    pub fn is_partial(&self) -> bool {
        self.token().is_some() != self.user().is_some()
    }

    pub fn set_token(&self, token: &str) -> Result<(), StoreError> {
        self.kv.set(TOKEN_KEY, token.to_string())
    }

    pub fn set_user(&self, user: &SessionUser) -> Result<(), StoreError> {
        self.kv.set(USER_KEY, encode_user(user)?)
    }

    /// Write token and user together.
    pub fn persist(&self, token: &str, user: &SessionUser) -> Result<(), StoreError> {
        let encoded = encode_user(user)?;
        self.kv
            .set_many(&[(TOKEN_KEY, token.to_string()), (USER_KEY, encoded)])
    }

    /// Remove both keys together.
    pub fn clear(&self) -> Result<(), StoreError> {
        self.kv.remove_many(&[TOKEN_KEY, USER_KEY])
    }
}

fn encode_user(user: &SessionUser) -> Result<String, StoreError> {
    Ok(serde_json::to_string(&user.clone().normalized())?)
}
