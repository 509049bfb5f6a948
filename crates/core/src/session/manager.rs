use std::sync::Arc;

use tracing::debug;

use crate::errors::CoreError;
use crate::storage::{KeyValueStore, KEY_REFRESH_TOKEN, KEY_TOKEN};

/// Owns the access/refresh token pair for the current user.
///
/// The credential pair is the only state shared across unrelated parts of
/// the system; it is mutated exclusively through `login`/`logout` here.
/// Token validity is never checked locally — only the backend decides
/// (see `SessionGuard`). The refresh token is persisted but never exchanged;
/// an expired session is recovered by logging in again.
pub struct SessionManager {
    store: Arc<dyn KeyValueStore>,
    token: Option<String>,
    refresh_token: Option<String>,
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never print credential values
        f.debug_struct("SessionManager")
            .field("authenticated", &self.is_authenticated())
            .field("has_refresh_token", &self.refresh_token.is_some())
            .finish()
    }
}

impl SessionManager {
    /// Restore the session from durable storage at process start.
    /// Missing values are treated as "not logged in", not as an error.
    pub fn load(store: Arc<dyn KeyValueStore>) -> Result<Self, CoreError> {
        let token = store.get(KEY_TOKEN)?;
        let refresh_token = store.get(KEY_REFRESH_TOKEN)?;
        debug!(restored = token.is_some(), "session loaded from storage");
        Ok(Self {
            store,
            token,
            refresh_token,
        })
    }

    /// Store a freshly exchanged credential pair, in memory and durably.
    /// Does not itself call the network — the exchange happens in the
    /// request layer before this is invoked.
    pub fn login(
        &mut self,
        token: impl Into<String>,
        refresh_token: impl Into<String>,
    ) -> Result<(), CoreError> {
        let token = token.into();
        let refresh_token = refresh_token.into();
        self.store.set(KEY_TOKEN, &token)?;
        self.store.set(KEY_REFRESH_TOKEN, &refresh_token)?;
        self.token = Some(token);
        self.refresh_token = Some(refresh_token);
        debug!("session established");
        Ok(())
    }

    /// Clear both credentials from memory and durable storage.
    /// Idempotent — logging out twice leaves the same end state. Memory is
    /// cleared before storage so the session is unauthenticated even if the
    /// store fails.
    pub fn logout(&mut self) -> Result<(), CoreError> {
        self.token = None;
        self.refresh_token = None;
        self.store.remove(KEY_TOKEN)?;
        self.store.remove(KEY_REFRESH_TOKEN)?;
        debug!("session cleared");
        Ok(())
    }

    /// True iff an access token is held. Says nothing about server-side
    /// validity.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// Borrow the access token, if any.
    #[must_use]
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Borrow the refresh token, if any.
    #[must_use]
    pub fn refresh_token(&self) -> Option<&str> {
        self.refresh_token.as_deref()
    }
}
