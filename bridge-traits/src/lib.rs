//! # Host Bridge Traits
//!
//! Platform abstraction traits that each host (desktop shell, browser) must
//! implement for the ACE client core.
//!
//! ## Overview
//!
//! The core never talks to the network, the storage layer or the address bar
//! directly. Every such capability is expressed as a trait here and injected
//! at bootstrap time, which keeps the auth orchestration testable with plain
//! in-memory doubles.
//!
//! ## Traits
//!
//! ### Networking
//! - [`HttpClient`](http::HttpClient) - Async HTTP with timeouts and retry
//!
//! ### Storage
//! - [`SettingsStore`](storage::SettingsStore) - Durable key-value storage
//!   (localStorage in the browser, SQLite on desktop)
//! - [`SettingsTransaction`](storage::SettingsTransaction) - Atomic multi-key writes
//!
//! ### Navigation
//! - [`Navigator`](navigation::Navigator) - Address bar / history access
//!
//! ### Utilities
//! - [`LoggerSink`](logging::LoggerSink) - Forward structured logs to host logging
//!
//! ## Platform Requirements
//!
//! | Platform | Implementation Crate |
//! |----------|---------------------|
//! | Desktop  | `bridge-desktop`    |
//! | Web      | `bridge-wasm`       |
//!
//! ## Error Handling
//!
//! All bridge traits use [`BridgeError`](error::BridgeError). Implementations
//! convert platform errors into it and keep messages actionable.
//!
//! ## Thread Safety
//!
//! Native implementations must be `Send + Sync`. On `wasm32` the bound is
//! relaxed through [`PlatformSendSync`](platform::PlatformSendSync) because
//! browser handles are single-threaded.

pub mod error;
pub mod http;
pub mod logging;
pub mod navigation;
pub mod platform;
pub mod storage;

pub use error::BridgeError;

// Re-export commonly used types
pub use http::{HttpClient, HttpMethod, HttpRequest, HttpResponse, RetryPolicy};
pub use logging::{LogEntry, LogLevel, LoggerSink};
pub use navigation::{Location, NavigateOptions, Navigator};
pub use platform::{PlatformSend, PlatformSendSync};
pub use storage::{SettingsStore, SettingsTransaction};
