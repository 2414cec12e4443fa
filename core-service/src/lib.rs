//! Client façade and bootstrap helpers for the ACE advising app.
//!
//! This crate wires host-provided bridges (HTTP, settings, navigation) into
//! the auth core and exposes typed clients for the advising backend:
//! student profiles, chat sessions, the policy vault and cosmetic UI
//! preferences. Desktop hosts typically enable the `desktop-shims` feature
//! (which depends on `bridge-desktop`), whereas WebAssembly builds enable
//! the `wasm` feature and rely on the adapters from `bridge-wasm`.

pub mod bootstrap;
pub mod chat;
pub mod client;
pub mod error;
pub mod policy;
pub mod preferences;
pub mod profile;
#[cfg(all(feature = "wasm", target_arch = "wasm32"))]
pub mod wasm;

#[cfg(test)]
mod test_support;

#[cfg(all(feature = "desktop-shims", not(target_arch = "wasm32")))]
pub use bootstrap::bootstrap;
pub use bootstrap::bootstrap_with;
#[cfg(all(feature = "wasm", target_arch = "wasm32"))]
pub use bootstrap::{bootstrap_wasm, WasmBridgeConfig};
pub use chat::{
    AdvisorResponse, ChatApi, ChatMessage, ChatSession, ChatSummary, RiskLevel, Role,
    SendMessageResponse, SourceRef,
};
pub use client::AdvisorClient;
pub use error::{ApiError, ApiResult, Result, ServiceError};
pub use policy::{parse_tags, Policy, PolicyApi};
pub use preferences::{PreferencesStore, UiPreferences};
pub use profile::{ProfileApi, ProfileOptions, StudentInsight, StudentProfile};

pub use core_auth::{AppRouter, AuthManager, DispatchOutcome, GuardState, UserRecord};
pub use core_runtime::{ClientConfig, CoreEvent};
