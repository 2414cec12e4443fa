//! # Desktop Bridge Implementations
//!
//! Default implementations of bridge traits for desktop platforms
//! (macOS, Windows, Linux).
//!
//! ## Overview
//!
//! - `HttpClient` using `reqwest` with rustls
//! - `SettingsStore` using a SQLite-backed key-value table
//! - `Navigator` as an in-process history stack
//!
//! ## Usage
//!
//! ```ignore
//! use bridge_desktop::{HistoryNavigator, ReqwestHttpClient, SqliteSettingsStore};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> bridge_traits::error::Result<()> {
//!     let http = ReqwestHttpClient::with_timeout(Duration::from_secs(30))?;
//!     let settings = SqliteSettingsStore::new("/tmp/ace/settings.db".into()).await?;
//!     let navigator = HistoryNavigator::new("/");
//!
//!     // Use in core configuration
//!     Ok(())
//! }
//! ```

mod http;
mod navigation;
mod settings;

pub use http::ReqwestHttpClient;
pub use navigation::HistoryNavigator;
pub use settings::SqliteSettingsStore;
