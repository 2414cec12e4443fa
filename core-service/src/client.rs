//! The client façade handed to host shells.

use crate::chat::ChatApi;
use crate::error::Result;
use crate::policy::PolicyApi;
use crate::preferences::PreferencesStore;
use crate::profile::ProfileApi;
use core_auth::{AppRouter, AuthContext, AuthManager, RouteTable};
use core_runtime::config::ClientConfig;
use core_runtime::events::{CoreEvent, EventBus, EventStream, Receiver};
use std::sync::Arc;
use tracing::info;

/// Everything a host needs to run the advising client: routing, auth flows
/// and the typed backend APIs, all sharing one session.
#[derive(Clone)]
pub struct AdvisorClient {
    context: AuthContext,
    router: Arc<AppRouter>,
    auth: Arc<AuthManager>,
    profile: ProfileApi,
    chat: ChatApi,
    policies: PolicyApi,
    preferences: PreferencesStore,
}

impl AdvisorClient {
    /// Wire the client with the default route table.
    ///
    /// Hydrates the session from storage before returning, so the first
    /// [`AppRouter::dispatch`] already sees a persisted login.
    pub async fn new(config: ClientConfig) -> Result<Self> {
        Self::with_routes(config, RouteTable::default()).await
    }

    pub async fn with_routes(config: ClientConfig, table: RouteTable) -> Result<Self> {
        let context = AuthContext::from_config(&config, EventBus::default());
        let session = context.store.hydrate().await?;
        info!(
            api_base_url = %config.api_base_url,
            restored_session = session.is_some(),
            "Advisor client initialized"
        );

        let gateway = Arc::clone(&context.gateway);
        Ok(Self {
            router: Arc::new(AppRouter::new(context.clone(), table)),
            auth: Arc::new(
                AuthManager::new(context.clone()).with_logout_timeout(config.logout_timeout),
            ),
            profile: ProfileApi::new(Arc::clone(&gateway)),
            chat: ChatApi::new(Arc::clone(&gateway)),
            policies: PolicyApi::new(gateway),
            preferences: PreferencesStore::new(Arc::clone(&config.settings_store)),
            context,
        })
    }

    pub fn context(&self) -> &AuthContext {
        &self.context
    }

    pub fn router(&self) -> Arc<AppRouter> {
        Arc::clone(&self.router)
    }

    pub fn auth(&self) -> &AuthManager {
        &self.auth
    }

    pub fn profile(&self) -> &ProfileApi {
        &self.profile
    }

    pub fn chat(&self) -> &ChatApi {
        &self.chat
    }

    pub fn policies(&self) -> &PolicyApi {
        &self.policies
    }

    pub fn preferences(&self) -> &PreferencesStore {
        &self.preferences
    }

    /// Subscribe to session and route events.
    pub fn subscribe(&self) -> Receiver<CoreEvent> {
        self.context.events.subscribe()
    }

    /// Session lifecycle events only, for hosts that refresh their header
    /// or account menu on sign-in and sign-out.
    pub fn auth_events(&self) -> EventStream {
        EventStream::new(self.subscribe()).filter(|event| matches!(event, CoreEvent::Auth(_)))
    }
}

impl std::fmt::Debug for AdvisorClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdvisorClient")
            .field("gateway", &self.context.gateway)
            .field("router", &self.router)
            .finish()
    }
}
