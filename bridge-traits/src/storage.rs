//! Durable Key-Value Storage Abstraction
//!
//! The session slots and the cosmetic UI preferences both live in a
//! [`SettingsStore`]. Multi-key writes that must never be observed half-done
//! (the token/user pair) go through a [`SettingsTransaction`].

use crate::error::Result;
use crate::platform::{PlatformSend, PlatformSendSync};

/// Key-value settings storage trait
///
/// Abstracts platform-specific durable storage:
/// - Web: `window.localStorage`
/// - Desktop: SQLite-backed settings table
///
/// # Example
///
/// ```ignore
/// use bridge_traits::storage::SettingsStore;
///
/// async fn remember_sidebar(store: &dyn SettingsStore, collapsed: bool) -> Result<()> {
///     store.set_bool("ace_sidebar_collapsed", collapsed).await
/// }
/// ```
#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
pub trait SettingsStore: PlatformSendSync {
    /// Store a string value
    async fn set_string(&self, key: &str, value: &str) -> Result<()>;

    /// Retrieve a string value
    async fn get_string(&self, key: &str) -> Result<Option<String>>;

    /// Store a boolean value
    async fn set_bool(&self, key: &str, value: bool) -> Result<()> {
        self.set_string(key, if value { "true" } else { "false" })
            .await
    }

    /// Retrieve a boolean value
    ///
    /// Values that are not `"true"`/`"false"` read as absent.
    async fn get_bool(&self, key: &str) -> Result<Option<bool>> {
        Ok(self
            .get_string(key)
            .await?
            .and_then(|raw| raw.parse::<bool>().ok()))
    }

    /// Delete a setting. Deleting a missing key is not an error.
    async fn delete(&self, key: &str) -> Result<()>;

    /// Check if a setting exists
    async fn has_key(&self, key: &str) -> Result<bool> {
        Ok(self.get_string(key).await?.is_some())
    }

    /// List all setting keys
    async fn list_keys(&self) -> Result<Vec<String>>;

    /// Begin a transaction for atomic updates
    ///
    /// Nothing staged in the transaction is visible until `commit` returns.
    /// Dropping the transaction without committing discards it.
    async fn begin_transaction(&self) -> Result<Box<dyn SettingsTransaction>>;
}

/// Transaction for atomic settings updates
#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
pub trait SettingsTransaction: PlatformSend {
    /// Stage a write
    async fn set_string(&mut self, key: &str, value: &str) -> Result<()>;

    /// Stage a removal
    async fn delete(&mut self, key: &str) -> Result<()>;

    /// Apply every staged change
    async fn commit(self: Box<Self>) -> Result<()>;

    /// Discard every staged change
    async fn rollback(self: Box<Self>) -> Result<()>;
}
