//! # Client Configuration Module
//!
//! Builds the [`ClientConfig`] that wires the ACE client core to its host.
//!
//! ## Overview
//!
//! The builder collects the backend base URL, the host bridges and a few
//! tunables, then validates everything before the core starts. Missing
//! capabilities fail fast with [`Error::CapabilityMissing`] and an actionable
//! message.
//!
//! ## Required Dependencies
//!
//! - `HttpClient` - all backend traffic
//! - `SettingsStore` - durable session slots and UI preferences
//! - `Navigator` - address bar and history
//!
//! When the `desktop-shims` feature is enabled, desktop-ready defaults are
//! injected for any of the three that were not provided (reqwest client,
//! SQLite settings under `data_dir`, in-memory history).
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::ClientConfig;
//! use std::sync::Arc;
//!
//! let config = ClientConfig::builder()
//!     .api_base_url("https://ace.example.edu")
//!     .http_client(Arc::new(MyHttpClient))
//!     .settings_store(Arc::new(MySettingsStore))
//!     .navigator(Arc::new(MyNavigator))
//!     .build()?;
//!
//! assert_eq!(config.endpoint("/api/auth/me"), "https://ace.example.edu/api/auth/me");
//! ```

use crate::error::{Error, Result};
use bridge_traits::{HttpClient, Navigator, SettingsStore};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Default timeout for ordinary backend calls.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Default bound on the best-effort server-side logout call.
pub const DEFAULT_LOGOUT_TIMEOUT: Duration = Duration::from_secs(5);

/// Client-side paths the auth core redirects between.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePaths {
    /// Where unauthenticated users land
    pub login: String,
    /// Profile questionnaire for users with `profile_complete == false`
    pub onboarding: String,
    /// The main assistant, target of public-route redirects
    pub main: String,
    /// Target for unmatched paths
    pub fallback: String,
}

impl Default for RoutePaths {
    fn default() -> Self {
        Self {
            login: "/login".to_string(),
            onboarding: "/onboarding".to_string(),
            main: "/assistant".to_string(),
            fallback: "/".to_string(),
        }
    }
}

impl RoutePaths {
    fn validate(&self) -> Result<()> {
        for (name, path) in [
            ("login", &self.login),
            ("onboarding", &self.onboarding),
            ("main", &self.main),
            ("fallback", &self.fallback),
        ] {
            if !path.starts_with('/') {
                return Err(Error::Config(format!(
                    "Route path '{}' must start with '/', got '{}'",
                    name, path
                )));
            }
            if path.contains('#') || path.contains('?') {
                return Err(Error::Config(format!(
                    "Route path '{}' must not carry a query or fragment, got '{}'",
                    name, path
                )));
            }
        }

        if self.login == self.main || self.login == self.onboarding {
            return Err(Error::Config(
                "Login route must differ from the main and onboarding routes".to_string(),
            ));
        }

        Ok(())
    }
}

/// Runtime configuration for the ACE client core.
///
/// Use [`ClientConfigBuilder`] to construct instances.
#[derive(Clone)]
pub struct ClientConfig {
    /// Backend origin without a trailing slash, e.g. `https://ace.example.edu`
    pub api_base_url: String,

    pub http_client: Arc<dyn HttpClient>,

    /// Durable storage for the session slots and UI preferences
    pub settings_store: Arc<dyn SettingsStore>,

    pub navigator: Arc<dyn Navigator>,

    pub routes: RoutePaths,

    pub request_timeout: Duration,

    pub logout_timeout: Duration,
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_base_url", &self.api_base_url)
            .field("http_client", &"HttpClient { ... }")
            .field("settings_store", &"SettingsStore { ... }")
            .field("navigator", &"Navigator { ... }")
            .field("routes", &self.routes)
            .field("request_timeout", &self.request_timeout)
            .field("logout_timeout", &self.logout_timeout)
            .finish()
    }
}

impl ClientConfig {
    /// Creates a new builder.
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }

    /// Absolute URL for a backend path such as `/api/auth/me`.
    pub fn endpoint(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.api_base_url, path)
        } else {
            format!("{}/{}", self.api_base_url, path)
        }
    }

    /// Validates the configuration.
    ///
    /// Checks the base URL scheme, the route table and the timeouts.
    pub fn validate(&self) -> Result<()> {
        normalize_base_url(&self.api_base_url)?;
        self.routes.validate()?;

        if self.request_timeout.is_zero() {
            return Err(Error::Config(
                "Request timeout must be greater than zero".to_string(),
            ));
        }

        if self.logout_timeout.is_zero() {
            return Err(Error::Config(
                "Logout timeout must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }
}

fn normalize_base_url(raw: &str) -> Result<String> {
    let parsed = url::Url::parse(raw)
        .map_err(|e| Error::Config(format!("Invalid API base URL '{}': {}", raw, e)))?;

    match parsed.scheme() {
        "http" | "https" => {}
        other => {
            return Err(Error::Config(format!(
                "API base URL must use http or https, got '{}'",
                other
            )))
        }
    }

    if parsed.fragment().is_some() || parsed.query().is_some() {
        return Err(Error::Config(
            "API base URL must not carry a query or fragment".to_string(),
        ));
    }

    Ok(parsed.as_str().trim_end_matches('/').to_string())
}

#[cfg(not(feature = "desktop-shims"))]
fn http_client_missing_error() -> Error {
    Error::CapabilityMissing {
        capability: "HttpClient".to_string(),
        message: "HttpClient implementation is required for backend calls. \
                 Desktop: enable the 'desktop-shims' feature to use ReqwestHttpClient. \
                 Web: inject bridge_wasm::WasmHttpClient."
            .to_string(),
    }
}

#[cfg(not(feature = "desktop-shims"))]
fn settings_store_missing_error() -> Error {
    Error::CapabilityMissing {
        capability: "SettingsStore".to_string(),
        message: "SettingsStore implementation is required for the session slots. \
                 Desktop: enable the 'desktop-shims' feature and set data_dir. \
                 Web: inject bridge_wasm::LocalStorageSettingsStore."
            .to_string(),
    }
}

#[cfg(not(feature = "desktop-shims"))]
fn navigator_missing_error() -> Error {
    Error::CapabilityMissing {
        capability: "Navigator".to_string(),
        message: "Navigator implementation is required for redirects. \
                 Desktop: enable the 'desktop-shims' feature to use HistoryNavigator. \
                 Web: inject bridge_wasm::BrowserNavigator."
            .to_string(),
    }
}

#[cfg(feature = "desktop-shims")]
fn provide_default_http_client(timeout: Duration) -> Result<Arc<dyn HttpClient>> {
    use bridge_desktop::ReqwestHttpClient;

    let client = ReqwestHttpClient::with_timeout(timeout)
        .map_err(|e| Error::Internal(format!("Failed to build default HttpClient: {}", e)))?;
    let client: Arc<dyn HttpClient> = Arc::new(client);
    Ok(client)
}

#[cfg(not(feature = "desktop-shims"))]
fn provide_default_http_client(_timeout: Duration) -> Result<Arc<dyn HttpClient>> {
    Err(http_client_missing_error())
}

#[cfg(feature = "desktop-shims")]
fn provide_default_navigator(initial: &str) -> Result<Arc<dyn Navigator>> {
    use bridge_desktop::HistoryNavigator;

    let navigator: Arc<dyn Navigator> = Arc::new(HistoryNavigator::new(initial));
    Ok(navigator)
}

#[cfg(not(feature = "desktop-shims"))]
fn provide_default_navigator(_initial: &str) -> Result<Arc<dyn Navigator>> {
    Err(navigator_missing_error())
}

#[cfg(feature = "desktop-shims")]
fn provide_default_settings_store(data_dir: Option<&PathBuf>) -> Result<Arc<dyn SettingsStore>> {
    use bridge_desktop::SqliteSettingsStore;
    use std::thread;
    use tokio::runtime::{Handle, Runtime};

    let data_dir = data_dir.ok_or_else(|| Error::CapabilityMissing {
        capability: "SettingsStore".to_string(),
        message: "No SettingsStore provided and no data_dir set for the default \
                 SqliteSettingsStore. Use .data_dir() or .settings_store()."
            .to_string(),
    })?;
    let path = data_dir.join("settings.db");

    let init_store = |path: PathBuf| -> Result<_> {
        let runtime = Runtime::new().map_err(|e| {
            Error::Internal(format!(
                "Failed to create Tokio runtime for default settings store: {}",
                e
            ))
        })?;

        runtime
            .block_on(SqliteSettingsStore::new(path))
            .map_err(|e| {
                Error::Internal(format!("Failed to initialize default SettingsStore: {}", e))
            })
    };

    // A nested runtime cannot be started from inside a Tokio worker.
    let store = match Handle::try_current() {
        Ok(_) => thread::spawn(move || init_store(path))
            .join()
            .map_err(|_| {
                Error::Internal(
                    "Worker thread panicked while creating default SettingsStore".to_string(),
                )
            })??,
        Err(_) => init_store(path)?,
    };

    let store: Arc<dyn SettingsStore> = Arc::new(store);
    Ok(store)
}

#[cfg(not(feature = "desktop-shims"))]
fn provide_default_settings_store(_data_dir: Option<&PathBuf>) -> Result<Arc<dyn SettingsStore>> {
    Err(settings_store_missing_error())
}

/// Builder for constructing [`ClientConfig`] instances.
#[derive(Default)]
pub struct ClientConfigBuilder {
    api_base_url: Option<String>,
    http_client: Option<Arc<dyn HttpClient>>,
    settings_store: Option<Arc<dyn SettingsStore>>,
    navigator: Option<Arc<dyn Navigator>>,
    data_dir: Option<PathBuf>,
    routes: Option<RoutePaths>,
    request_timeout: Option<Duration>,
    logout_timeout: Option<Duration>,
}

impl ClientConfigBuilder {
    /// Backend origin, e.g. `https://ace.example.edu`. Required.
    pub fn api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = Some(url.into());
        self
    }

    pub fn http_client(mut self, client: Arc<dyn HttpClient>) -> Self {
        self.http_client = Some(client);
        self
    }

    pub fn settings_store(mut self, store: Arc<dyn SettingsStore>) -> Self {
        self.settings_store = Some(store);
        self
    }

    pub fn navigator(mut self, navigator: Arc<dyn Navigator>) -> Self {
        self.navigator = Some(navigator);
        self
    }

    /// Directory for the default desktop settings database.
    ///
    /// Only consulted when `desktop-shims` supplies the `SettingsStore`.
    pub fn data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = Some(dir.into());
        self
    }

    pub fn routes(mut self, routes: RoutePaths) -> Self {
        self.routes = Some(routes);
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    pub fn logout_timeout(mut self, timeout: Duration) -> Self {
        self.logout_timeout = Some(timeout);
        self
    }

    /// Builds and validates the configuration.
    ///
    /// # Errors
    ///
    /// - [`Error::Config`] when the base URL is missing or invalid, or a
    ///   route/timeout is malformed
    /// - [`Error::CapabilityMissing`] when a bridge is absent and no default
    ///   can be provided
    pub fn build(self) -> Result<ClientConfig> {
        let raw_url = self.api_base_url.ok_or_else(|| {
            Error::Config("API base URL is required. Use .api_base_url() to set it.".to_string())
        })?;
        let api_base_url = normalize_base_url(&raw_url)?;

        let routes = self.routes.unwrap_or_default();
        let request_timeout = self.request_timeout.unwrap_or(DEFAULT_REQUEST_TIMEOUT);

        let http_client = match self.http_client {
            Some(client) => client,
            None => provide_default_http_client(request_timeout)?,
        };

        let settings_store = match self.settings_store {
            Some(store) => store,
            None => provide_default_settings_store(self.data_dir.as_ref())?,
        };

        let navigator = match self.navigator {
            Some(navigator) => navigator,
            None => provide_default_navigator(&routes.fallback)?,
        };

        let config = ClientConfig {
            api_base_url,
            http_client,
            settings_store,
            navigator,
            routes,
            request_timeout,
            logout_timeout: self.logout_timeout.unwrap_or(DEFAULT_LOGOUT_TIMEOUT),
        };

        config.validate()?;

        Ok(config)
    }
}
