//! Convenience helpers for wiring all wasm bridge implementations together.
//!
//! Host shells can use [`build_wasm_bridges`] to construct the fetch client,
//! the `localStorage` settings store and the History API navigator in one
//! call. The result mirrors the role that `bridge-desktop` plays for native
//! targets.

use std::{sync::Arc, time::Duration};

use bridge_traits::{
    error::Result as BridgeResult, http::HttpClient, navigation::Navigator,
    storage::SettingsStore,
};
use tracing::info;

use crate::{
    http::WasmHttpClient, navigation::BrowserNavigator, storage::LocalStorageSettingsStore,
};

/// Configuration for [`build_wasm_bridges`].
#[derive(Debug, Clone)]
pub struct WasmBridgeConfig {
    /// Prefix for `localStorage` keys; empty writes keys verbatim.
    pub namespace: String,
    /// Default fetch timeout.
    pub request_timeout: Duration,
}

impl WasmBridgeConfig {
    /// Create a new config using the provided namespace.
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            request_timeout: Duration::from_secs(30),
        }
    }

    /// Override the default fetch timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

impl Default for WasmBridgeConfig {
    fn default() -> Self {
        Self::new("")
    }
}

/// Fully constructed wasm bridge objects ready for injection into the core.
pub struct WasmBridgeSet {
    /// HTTP client powered by browser `fetch`.
    pub http_client: Arc<dyn HttpClient>,
    /// Settings store layered on `localStorage`.
    pub settings_store: Arc<dyn SettingsStore>,
    /// History API navigator.
    pub navigator: Arc<dyn Navigator>,
}

/// Build the default wasm bridge stack.
///
/// Hosts call this during startup (e.g. inside their wasm-bindgen entry
/// point) and pass the trait objects into `core-service`.
pub async fn build_wasm_bridges(config: WasmBridgeConfig) -> BridgeResult<WasmBridgeSet> {
    let http_client: Arc<dyn HttpClient> =
        Arc::new(WasmHttpClient::with_timeout(config.request_timeout)?);
    let settings_store: Arc<dyn SettingsStore> =
        Arc::new(LocalStorageSettingsStore::with_namespace(&config.namespace)?);
    let navigator: Arc<dyn Navigator> = Arc::new(BrowserNavigator::new()?);

    info!(namespace = %config.namespace, "Browser bridges ready");

    Ok(WasmBridgeSet {
        http_client,
        settings_store,
        navigator,
    })
}
