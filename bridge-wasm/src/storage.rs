//! `localStorage` implementation of the settings bridge.
//!
//! Keys are written verbatim by default so the session slots sit at
//! `ace_session_token` / `ace_user`, readable by any tab of the same origin.
//! An optional namespace prefixes every key for hosts that share an origin.

use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result as BridgeResult},
    storage::{SettingsStore, SettingsTransaction},
};

use crate::error::{window, WasmError};

fn local_storage() -> BridgeResult<web_sys::Storage> {
    window()?
        .local_storage()
        .map_err(|err| WasmError::js("localStorage", err))?
        .ok_or_else(|| BridgeError::NotAvailable("localStorage".into()))
}

fn storage_error(context: &str, err: wasm_bindgen::JsValue) -> BridgeError {
    BridgeError::StorageError(WasmError::js(context, err).to_string())
}

#[derive(Clone)]
/// Browser-backed settings store (plain-text key/value pairs).
pub struct LocalStorageSettingsStore {
    storage: web_sys::Storage,
    prefix: String,
}

impl LocalStorageSettingsStore {
    /// Store writing keys verbatim.
    pub fn new() -> BridgeResult<Self> {
        Ok(Self {
            storage: local_storage()?,
            prefix: String::new(),
        })
    }

    /// Store prefixing every key with `{namespace}::`.
    pub fn with_namespace(namespace: &str) -> BridgeResult<Self> {
        let prefix = if namespace.is_empty() {
            String::new()
        } else {
            format!("{namespace}::")
        };
        Ok(Self {
            storage: local_storage()?,
            prefix,
        })
    }

    fn key_for(&self, key: &str) -> String {
        format!("{}{}", self.prefix, key)
    }
}

#[async_trait(?Send)]
impl SettingsStore for LocalStorageSettingsStore {
    async fn set_string(&self, key: &str, value: &str) -> BridgeResult<()> {
        self.storage
            .set_item(&self.key_for(key), value)
            .map_err(|err| storage_error("set setting", err))
    }

    async fn get_string(&self, key: &str) -> BridgeResult<Option<String>> {
        self.storage
            .get_item(&self.key_for(key))
            .map_err(|err| storage_error("get setting", err))
    }

    async fn delete(&self, key: &str) -> BridgeResult<()> {
        self.storage
            .remove_item(&self.key_for(key))
            .map_err(|err| storage_error("remove setting", err))
    }

    async fn list_keys(&self) -> BridgeResult<Vec<String>> {
        let len = self
            .storage
            .length()
            .map_err(|err| storage_error("storage length", err))?;

        let mut keys = Vec::new();
        for idx in 0..len {
            if let Some(entry) = self
                .storage
                .key(idx)
                .map_err(|err| storage_error("storage key", err))?
            {
                if let Some(key) = entry.strip_prefix(&self.prefix) {
                    keys.push(key.to_string());
                }
            }
        }
        Ok(keys)
    }

    async fn begin_transaction(&self) -> BridgeResult<Box<dyn SettingsTransaction>> {
        Ok(Box::new(LocalSettingsTransaction {
            store: self.clone(),
            staged: Vec::new(),
        }))
    }
}

/// Staged writes applied in order on commit.
///
/// `localStorage` is synchronous and single-threaded per tab, so no other
/// code in this tab observes a half-applied commit. If a write fails
/// midway, the keys already written are restored to their prior values.
struct LocalSettingsTransaction {
    store: LocalStorageSettingsStore,
    staged: Vec<(String, Option<String>)>,
}

impl LocalSettingsTransaction {
    fn apply(&self, key: &str, value: Option<&str>) -> BridgeResult<()> {
        let key = self.store.key_for(key);
        match value {
            Some(value) => self
                .store
                .storage
                .set_item(&key, value)
                .map_err(|err| storage_error("txn set_item", err)),
            None => self
                .store
                .storage
                .remove_item(&key)
                .map_err(|err| storage_error("txn remove_item", err)),
        }
    }

    fn snapshot(&self, key: &str) -> BridgeResult<Option<String>> {
        self.store
            .storage
            .get_item(&self.store.key_for(key))
            .map_err(|err| storage_error("txn get_item", err))
    }
}

#[async_trait(?Send)]
impl SettingsTransaction for LocalSettingsTransaction {
    async fn set_string(&mut self, key: &str, value: &str) -> BridgeResult<()> {
        self.staged.push((key.to_string(), Some(value.to_string())));
        Ok(())
    }

    async fn delete(&mut self, key: &str) -> BridgeResult<()> {
        self.staged.push((key.to_string(), None));
        Ok(())
    }

    async fn commit(self: Box<Self>) -> BridgeResult<()> {
        let mut previous = Vec::with_capacity(self.staged.len());
        for (key, value) in &self.staged {
            previous.push((key.as_str(), self.snapshot(key)?));
            if let Err(err) = self.apply(key, value.as_deref()) {
                for (key, value) in previous.iter().rev() {
                    // Quota errors can hit the restore too; nothing more to do then.
                    let _ = self.apply(key, value.as_deref());
                }
                return Err(err);
            }
        }
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> BridgeResult<()> {
        Ok(())
    }
}
