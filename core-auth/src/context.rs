//! Shared wiring for the auth components.

use crate::gateway::AuthGateway;
use crate::session_store::SessionStore;
use bridge_traits::{HttpClient, Navigator};
use core_runtime::config::{ClientConfig, RoutePaths};
use core_runtime::events::EventBus;
use std::sync::Arc;
use std::time::Duration;

/// Everything a guard, the callback handler, the router and the manager
/// need, bundled once at bootstrap.
///
/// Cloning is cheap; all members are shared handles.
#[derive(Clone)]
pub struct AuthContext {
    pub store: Arc<SessionStore>,
    pub gateway: Arc<AuthGateway>,
    pub navigator: Arc<dyn Navigator>,
    pub routes: RoutePaths,
    pub events: EventBus,
}

impl AuthContext {
    pub fn new(
        http: Arc<dyn HttpClient>,
        store: Arc<SessionStore>,
        navigator: Arc<dyn Navigator>,
        api_base_url: impl Into<String>,
        routes: RoutePaths,
        events: EventBus,
    ) -> Self {
        let gateway = Arc::new(AuthGateway::new(
            http,
            Arc::clone(&store),
            Arc::clone(&navigator),
            api_base_url,
            routes.login.clone(),
            events.clone(),
        ));

        Self {
            store,
            gateway,
            navigator,
            routes,
            events,
        }
    }

    /// Wire the context from a validated [`ClientConfig`].
    ///
    /// The store is created but not hydrated; call
    /// [`SessionStore::hydrate`] before the first render.
    pub fn from_config(config: &ClientConfig, events: EventBus) -> Self {
        let store = Arc::new(SessionStore::new(Arc::clone(&config.settings_store)));
        Self::new(
            Arc::clone(&config.http_client),
            store,
            Arc::clone(&config.navigator),
            config.api_base_url.clone(),
            config.routes.clone(),
            events,
        )
        .with_request_timeout(config.request_timeout)
    }

    /// Default timeout applied to gateway requests that set none.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        let gateway = self.gateway.as_ref().clone().with_default_timeout(timeout);
        self.gateway = Arc::new(gateway);
        self
    }
}
