//! In-memory bridge doubles shared by the unit tests.

use crate::context::AuthContext;
use crate::session_store::SessionStore;
use crate::types::{SessionToken, UserRecord};
use bridge_traits::error::{BridgeError, Result as BridgeResult};
use bridge_traits::storage::SettingsTransaction;
use bridge_traits::{
    HttpClient, HttpRequest, HttpResponse, Location, NavigateOptions, Navigator, SettingsStore,
};
use core_runtime::config::RoutePaths;
use core_runtime::events::EventBus;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;
use tokio::sync::{Mutex as TokioMutex, Notify};

pub const BASE_URL: &str = "http://ace.test";

pub fn user(profile_complete: bool, is_admin: bool) -> UserRecord {
    UserRecord {
        user_id: "user_42".to_string(),
        email: "jordan@university.edu".to_string(),
        name: "Jordan".to_string(),
        picture: None,
        is_admin,
        profile_complete,
    }
}

pub fn user_body(profile_complete: bool, is_admin: bool) -> String {
    serde_json::to_string(&user(profile_complete, is_admin)).expect("serializable user")
}

pub fn auth_body(token: &str, profile_complete: bool) -> String {
    let mut value = serde_json::to_value(user(profile_complete, false)).expect("user value");
    value["session_token"] = serde_json::Value::String(token.to_string());
    value.to_string()
}

// ---------------------------------------------------------------------------
// Settings store
// ---------------------------------------------------------------------------

#[derive(Clone, Default)]
pub struct MockSettingsStore {
    pub data: Arc<TokioMutex<HashMap<String, String>>>,
    pub fail_commits: Arc<AtomicBool>,
}

impl MockSettingsStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn with_entries(entries: &[(&str, &str)]) -> Self {
        let store = Self::new();
        {
            let mut data = store.data.lock().await;
            for (key, value) in entries {
                data.insert(key.to_string(), value.to_string());
            }
        }
        store
    }

    pub async fn raw(&self, key: &str) -> Option<String> {
        self.data.lock().await.get(key).cloned()
    }
}

#[async_trait::async_trait]
impl SettingsStore for MockSettingsStore {
    async fn set_string(&self, key: &str, value: &str) -> BridgeResult<()> {
        self.data
            .lock()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn get_string(&self, key: &str) -> BridgeResult<Option<String>> {
        Ok(self.data.lock().await.get(key).cloned())
    }

    async fn delete(&self, key: &str) -> BridgeResult<()> {
        self.data.lock().await.remove(key);
        Ok(())
    }

    async fn list_keys(&self) -> BridgeResult<Vec<String>> {
        Ok(self.data.lock().await.keys().cloned().collect())
    }

    async fn begin_transaction(&self) -> BridgeResult<Box<dyn SettingsTransaction>> {
        Ok(Box::new(MockTransaction {
            data: Arc::clone(&self.data),
            fail_commit: self.fail_commits.load(Ordering::SeqCst),
            staged: Vec::new(),
        }))
    }
}

struct MockTransaction {
    data: Arc<TokioMutex<HashMap<String, String>>>,
    fail_commit: bool,
    staged: Vec<(String, Option<String>)>,
}

#[async_trait::async_trait]
impl SettingsTransaction for MockTransaction {
    async fn set_string(&mut self, key: &str, value: &str) -> BridgeResult<()> {
        self.staged.push((key.to_string(), Some(value.to_string())));
        Ok(())
    }

    async fn delete(&mut self, key: &str) -> BridgeResult<()> {
        self.staged.push((key.to_string(), None));
        Ok(())
    }

    async fn commit(self: Box<Self>) -> BridgeResult<()> {
        if self.fail_commit {
            return Err(BridgeError::StorageError("quota exceeded".to_string()));
        }
        let mut data = self.data.lock().await;
        for (key, value) in self.staged {
            match value {
                Some(value) => data.insert(key, value),
                None => data.remove(&key),
            };
        }
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> BridgeResult<()> {
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// HTTP client
// ---------------------------------------------------------------------------

type Responder = Box<dyn Fn(&HttpRequest) -> BridgeResult<HttpResponse> + Send + Sync>;

/// Scripted HTTP client recording every request it receives.
///
/// When a gate is installed each request waits for the gate before
/// answering; release it with `Notify::notify_waiters`.
pub struct MockHttpClient {
    responder: Responder,
    pub requests: StdMutex<Vec<HttpRequest>>,
    calls: AtomicUsize,
    gate: Option<Arc<Notify>>,
}

impl MockHttpClient {
    pub fn new<F>(responder: F) -> Self
    where
        F: Fn(&HttpRequest) -> BridgeResult<HttpResponse> + Send + Sync + 'static,
    {
        Self {
            responder: Box::new(responder),
            requests: StdMutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
            gate: None,
        }
    }

    /// Always answers with `status` and `body`.
    pub fn fixed(status: u16, body: impl Into<String>) -> Self {
        let body = body.into();
        Self::new(move |_| Ok(HttpResponse::new(status, body.clone())))
    }

    pub fn gated(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn recorded(&self) -> Vec<HttpRequest> {
        self.requests.lock().expect("requests lock").clone()
    }

    /// Yield until at least `n` requests have reached the client.
    pub async fn wait_for_calls(&self, n: usize) {
        while self.call_count() < n {
            tokio::task::yield_now().await;
        }
    }

    pub fn calls_to(&self, path: &str) -> usize {
        self.recorded()
            .iter()
            .filter(|request| request.url.ends_with(path))
            .count()
    }
}

#[async_trait::async_trait]
impl HttpClient for MockHttpClient {
    async fn execute(&self, request: HttpRequest) -> BridgeResult<HttpResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests
            .lock()
            .expect("requests lock")
            .push(request.clone());

        if let Some(gate) = &self.gate {
            gate.notified().await;
        }

        (self.responder)(&request)
    }
}

// ---------------------------------------------------------------------------
// Navigator
// ---------------------------------------------------------------------------

#[derive(Debug)]
struct NavState {
    location: Location,
    history: Vec<(String, NavigateOptions)>,
    fragment_strips: usize,
}

pub struct MockNavigator {
    state: StdMutex<NavState>,
}

impl MockNavigator {
    pub fn at(location: &str) -> Self {
        Self {
            state: StdMutex::new(NavState {
                location: Location::parse(location),
                history: Vec::new(),
                fragment_strips: 0,
            }),
        }
    }

    pub fn navigations(&self) -> Vec<(String, NavigateOptions)> {
        self.state.lock().expect("nav lock").history.clone()
    }

    pub fn navigations_to(&self, path: &str) -> usize {
        self.navigations()
            .iter()
            .filter(|(target, _)| target == path)
            .count()
    }

    pub fn fragment_strips(&self) -> usize {
        self.state.lock().expect("nav lock").fragment_strips
    }

    /// Simulate the user typing a new address.
    pub fn set_location(&self, location: &str) {
        self.state.lock().expect("nav lock").location = Location::parse(location);
    }
}

impl Navigator for MockNavigator {
    fn location(&self) -> Location {
        self.state.lock().expect("nav lock").location.clone()
    }

    fn navigate(&self, path: &str, options: NavigateOptions) -> BridgeResult<()> {
        let mut state = self.state.lock().expect("nav lock");
        state.location = Location::parse(path);
        state.history.push((path.to_string(), options));
        Ok(())
    }

    fn strip_fragment(&self) -> BridgeResult<()> {
        let mut state = self.state.lock().expect("nav lock");
        state.location = state.location.without_fragment();
        state.fragment_strips += 1;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Wiring
// ---------------------------------------------------------------------------

pub struct Harness {
    pub http: Arc<MockHttpClient>,
    pub settings: MockSettingsStore,
    pub navigator: Arc<MockNavigator>,
    pub context: AuthContext,
}

impl Harness {
    pub async fn new(http: MockHttpClient, location: &str) -> Self {
        Self::with_settings(http, MockSettingsStore::new(), location).await
    }

    pub async fn with_settings(
        http: MockHttpClient,
        settings: MockSettingsStore,
        location: &str,
    ) -> Self {
        let http = Arc::new(http);
        let navigator = Arc::new(MockNavigator::at(location));
        let store = Arc::new(SessionStore::new(Arc::new(settings.clone())));
        store.hydrate().await.expect("hydrate");

        let context = AuthContext::new(
            http.clone(),
            store,
            navigator.clone(),
            BASE_URL,
            RoutePaths::default(),
            EventBus::default(),
        )
        .with_request_timeout(Duration::from_secs(5));

        Self {
            http,
            settings,
            navigator,
            context,
        }
    }

    /// A harness with a stored session.
    pub async fn signed_in(http: MockHttpClient, location: &str, complete: bool) -> Self {
        let harness = Self::new(http, location).await;
        harness
            .context
            .store
            .set(SessionToken::new("session_abc"), user(complete, false))
            .await
            .expect("seed session");
        harness
    }
}
