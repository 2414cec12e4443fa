//! Session Store
//!
//! Process-wide holder of the current session token and cached user record,
//! mirrored into durable storage so a reload keeps the user signed in.
//!
//! ## Storage layout
//!
//! | Key                 | Value                         |
//! |---------------------|-------------------------------|
//! | `ace_session_token` | raw session token             |
//! | `ace_user`          | cached [`UserRecord`] as JSON |
//!
//! ## Consistency
//!
//! - Both slots are written and removed in one [`SettingsTransaction`], so a
//!   reload never sees a token without its user or the reverse.
//! - The in-memory pair is swapped under a single lock, so readers never see
//!   a torn pair either.
//! - Every mutation bumps a generation counter. The gateway tags each request
//!   with the generation it was sent under, which lets a late 401 from an old
//!   session leave a newer session alone.
//!
//! [`SettingsTransaction`]: bridge_traits::SettingsTransaction
//!
//! ## Example
//!
//! ```no_run
//! use core_auth::{SessionStore, SessionToken, UserRecord};
//! use std::sync::Arc;
//! # use bridge_traits::SettingsStore;
//! # async fn example(settings: Arc<dyn SettingsStore>, user: UserRecord) -> core_auth::Result<()> {
//! let store = SessionStore::new(settings);
//! store.hydrate().await?;
//!
//! store.set(SessionToken::new("session_4f1c"), user).await?;
//! assert!(store.has_token());
//!
//! store.clear().await?;
//! assert!(store.get().is_none());
//! # Ok(())
//! # }
//! ```

use crate::error::{AuthError, Result};
use crate::types::{Session, SessionToken, UserRecord};
use bridge_traits::SettingsStore;
use std::sync::{Arc, PoisonError, RwLock};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Storage key for the session token.
pub const TOKEN_KEY: &str = "ace_session_token";

/// Storage key for the cached user JSON.
pub const USER_KEY: &str = "ace_user";

#[derive(Debug, Default)]
struct SessionState {
    current: Option<Session>,
    generation: u64,
}

/// Token and generation captured together for one outbound request.
#[derive(Debug, Clone)]
pub struct RequestCredential {
    pub token: Option<SessionToken>,
    pub generation: u64,
}

pub struct SessionStore {
    settings: Arc<dyn SettingsStore>,
    state: RwLock<SessionState>,
    /// Serializes mutations so storage and memory change in the same order.
    mutation: Mutex<()>,
}

impl SessionStore {
    pub fn new(settings: Arc<dyn SettingsStore>) -> Self {
        debug!("Initializing SessionStore");
        Self {
            settings,
            state: RwLock::new(SessionState::default()),
            mutation: Mutex::new(()),
        }
    }

    /// Load the session persisted by a previous run.
    ///
    /// A blank token slot is treated as absent. A user slot that no longer
    /// parses is deleted and the session keeps only its token.
    pub async fn hydrate(&self) -> Result<Option<Session>> {
        let _guard = self.mutation.lock().await;

        let token = self
            .settings
            .get_string(TOKEN_KEY)
            .await
            .map_err(AuthError::storage)?
            .map(SessionToken::new)
            .filter(|token| !token.is_empty());

        let session = match token {
            Some(token) => Some(Session {
                token,
                user: self.load_cached_user().await,
            }),
            None => None,
        };

        info!(has_session = session.is_some(), "Session hydrated from storage");
        self.replace(session.clone());
        Ok(session)
    }

    async fn load_cached_user(&self) -> Option<UserRecord> {
        let raw = match self.settings.get_string(USER_KEY).await {
            Ok(raw) => raw?,
            Err(e) => {
                warn!(error = %e, "Failed to read cached user");
                return None;
            }
        };

        match serde_json::from_str::<UserRecord>(&raw) {
            Ok(user) => Some(user),
            Err(e) => {
                warn!(error = %e, "Cached user is corrupted, deleting it");
                if let Err(e) = self.settings.delete(USER_KEY).await {
                    warn!(error = %e, "Failed to delete corrupted cached user");
                }
                None
            }
        }
    }

    /// Store a new session, replacing any previous one.
    ///
    /// Durable storage is written first; memory only changes once the write
    /// committed, so a failed write leaves the previous session intact.
    pub async fn set(&self, token: SessionToken, user: UserRecord) -> Result<()> {
        if token.is_empty() {
            return Err(AuthError::InvalidResponse(
                "Backend returned an empty session token".to_string(),
            ));
        }

        let user_json = serde_json::to_string(&user)
            .map_err(|e| AuthError::Storage(format!("Failed to serialize user: {}", e)))?;

        let _guard = self.mutation.lock().await;

        let mut tx = self
            .settings
            .begin_transaction()
            .await
            .map_err(AuthError::storage)?;
        tx.set_string(TOKEN_KEY, token.as_str())
            .await
            .map_err(AuthError::storage)?;
        tx.set_string(USER_KEY, &user_json)
            .await
            .map_err(AuthError::storage)?;
        tx.commit().await.map_err(AuthError::storage)?;

        debug!(user_id = %user.user_id, "Session stored");
        self.replace(Some(Session {
            token,
            user: Some(user),
        }));
        Ok(())
    }

    /// Drop the session.
    ///
    /// Memory is cleared before storage, so the session is gone for every
    /// reader even if the storage delete fails.
    pub async fn clear(&self) -> Result<()> {
        let _guard = self.mutation.lock().await;
        self.replace(None);
        self.delete_persisted().await
    }

    /// Clear the session only if nothing changed since `generation`.
    ///
    /// Returns `true` when this call performed the invalidation. Concurrent
    /// callers holding the same generation race for it and exactly one wins.
    pub async fn invalidate_if_current(&self, generation: u64) -> bool {
        let _guard = self.mutation.lock().await;

        {
            let mut state = self.write_state();
            if state.generation != generation {
                debug!(
                    expected = generation,
                    current = state.generation,
                    "Skipping stale session invalidation"
                );
                return false;
            }
            state.current = None;
            state.generation += 1;
        }

        if let Err(e) = self.delete_persisted().await {
            warn!(error = %e, "Failed to delete persisted session after rejection");
        }
        true
    }

    /// Replace the cached user while keeping the token.
    ///
    /// Ignored when the session changed since `generation` or no session
    /// is stored.
    pub async fn refresh_user(&self, generation: u64, user: UserRecord) -> Result<()> {
        let _guard = self.mutation.lock().await;

        if self.generation() != generation || !self.has_token() {
            return Ok(());
        }

        let user_json = serde_json::to_string(&user)
            .map_err(|e| AuthError::Storage(format!("Failed to serialize user: {}", e)))?;
        self.settings
            .set_string(USER_KEY, &user_json)
            .await
            .map_err(AuthError::storage)?;

        let mut state = self.write_state();
        if let Some(session) = state.current.as_mut() {
            session.user = Some(user);
        }
        Ok(())
    }

    /// The current session, if any.
    pub fn get(&self) -> Option<Session> {
        self.read_state().current.clone()
    }

    /// Whether a token is present locally. Says nothing about server validity.
    pub fn has_token(&self) -> bool {
        self.read_state().current.is_some()
    }

    /// The advisory cached user.
    pub fn cached_user(&self) -> Option<UserRecord> {
        self.read_state()
            .current
            .as_ref()
            .and_then(|session| session.user.clone())
    }

    pub fn generation(&self) -> u64 {
        self.read_state().generation
    }

    /// Token and generation read under one lock.
    pub fn credential(&self) -> RequestCredential {
        let state = self.read_state();
        RequestCredential {
            token: state.current.as_ref().map(|session| session.token.clone()),
            generation: state.generation,
        }
    }

    fn replace(&self, session: Option<Session>) {
        let mut state = self.write_state();
        state.current = session;
        state.generation += 1;
    }

    async fn delete_persisted(&self) -> Result<()> {
        let mut tx = self
            .settings
            .begin_transaction()
            .await
            .map_err(AuthError::storage)?;
        tx.delete(TOKEN_KEY).await.map_err(AuthError::storage)?;
        tx.delete(USER_KEY).await.map_err(AuthError::storage)?;
        tx.commit().await.map_err(AuthError::storage)
    }

    fn read_state(&self) -> std::sync::RwLockReadGuard<'_, SessionState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> std::sync::RwLockWriteGuard<'_, SessionState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("has_token", &self.has_token())
            .field("generation", &self.generation())
            .finish()
    }
}
