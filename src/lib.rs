//! Workspace placeholder crate.
//!
//! This crate exists to expose shared feature flags that map to the individual
//! workspace crates. Host applications can depend on `ace-workspace` and enable
//! `desktop-shims` or `wasm` without wiring `core-service` and the bridge
//! crates individually.

#[cfg(any(feature = "desktop-shims", feature = "wasm"))]
pub use core_service::*;
