//! WebAssembly Bridge Implementations
//!
//! Browser implementations of the traits defined in `bridge-traits`, built
//! on `web-sys` and `wasm-bindgen`.
//!
//! # Platform Support
//!
//! This crate is designed exclusively for the `wasm32-unknown-unknown` target.
//! It compiles to an empty crate elsewhere.
//!
//! # Implementations
//!
//! - [`WasmHttpClient`]: `fetch` with `AbortController` timeouts
//! - [`LocalStorageSettingsStore`]: `localStorage`, shared by every tab of
//!   the origin
//! - [`BrowserNavigator`]: `window.location` plus `pushState` / `replaceState`
//!
//! # Examples
//!
//! ```ignore
//! use bridge_wasm::{build_wasm_bridges, WasmBridgeConfig};
//!
//! let bridges = build_wasm_bridges(WasmBridgeConfig::default()).await?;
//! let location = bridges.navigator.location();
//! ```

#![cfg(target_arch = "wasm32")]
#![warn(missing_docs)]

pub mod bootstrap;
pub mod error;
pub mod http;
pub mod navigation;
pub mod storage;

// Re-export commonly used types
pub use bootstrap::{build_wasm_bridges, WasmBridgeConfig, WasmBridgeSet};
pub use error::{WasmError, WasmResult};
pub use http::WasmHttpClient;
pub use navigation::BrowserNavigator;
pub use storage::LocalStorageSettingsStore;
