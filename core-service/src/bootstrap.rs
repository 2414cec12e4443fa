//! Host bootstrappers.
//!
//! Desktop hosts lean on the `desktop-shims` defaults from `core-runtime`;
//! browser hosts build their bridges through `bridge-wasm`.

use crate::client::AdvisorClient;
use crate::error::Result;
use core_runtime::config::ClientConfig;

#[cfg(all(feature = "wasm", target_arch = "wasm32"))]
pub use bridge_wasm::WasmBridgeConfig;
#[cfg(all(feature = "wasm", target_arch = "wasm32"))]
use bridge_wasm::{build_wasm_bridges, WasmBridgeSet};
#[cfg(all(feature = "wasm", target_arch = "wasm32"))]
use crate::error::ServiceError;

/// Start a desktop client with reqwest, SQLite settings under `data_dir`
/// and an in-memory history starting at `/`.
///
/// ```ignore
/// let client = core_service::bootstrap("https://ace.example.edu", "/tmp/ace").await?;
/// client.router().dispatch().await;
/// ```
#[cfg(all(feature = "desktop-shims", not(target_arch = "wasm32")))]
pub async fn bootstrap(
    api_base_url: &str,
    data_dir: impl Into<std::path::PathBuf>,
) -> Result<AdvisorClient> {
    let config = ClientConfig::builder()
        .api_base_url(api_base_url)
        .data_dir(data_dir)
        .build()?;
    AdvisorClient::new(config).await
}

#[cfg(all(feature = "wasm", target_arch = "wasm32"))]
fn wasm_config(api_base_url: &str, bridges: WasmBridgeSet) -> core_runtime::Result<ClientConfig> {
    ClientConfig::builder()
        .api_base_url(api_base_url)
        .http_client(bridges.http_client)
        .settings_store(bridges.settings_store)
        .navigator(bridges.navigator)
        .build()
}

/// Start a browser client backed by `fetch`, `localStorage` and the
/// History API.
///
/// ```ignore
/// let config = WasmBridgeConfig::new("ace");
/// let client = core_service::bootstrap_wasm("https://ace.example.edu", config).await?;
/// ```
#[cfg(all(feature = "wasm", target_arch = "wasm32"))]
pub async fn bootstrap_wasm(api_base_url: &str, config: WasmBridgeConfig) -> Result<AdvisorClient> {
    let bridges = build_wasm_bridges(config)
        .await
        .map_err(|err| ServiceError::InitializationFailed(err.to_string()))?;
    AdvisorClient::new(wasm_config(api_base_url, bridges)?).await
}

/// Start a client from bridges the host already built.
pub async fn bootstrap_with(config: ClientConfig) -> Result<AdvisorClient> {
    AdvisorClient::new(config).await
}
