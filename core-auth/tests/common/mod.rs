//! Shared doubles for the integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use bridge_traits::error::{BridgeError, Result};
use bridge_traits::storage::SettingsTransaction;
use bridge_traits::{
    HttpClient, HttpRequest, HttpResponse, Location, NavigateOptions, Navigator, SettingsStore,
};
use core_auth::{AuthContext, SessionStore, SessionToken, UserRecord};
use core_runtime::config::RoutePaths;
use core_runtime::events::EventBus;
use mockall::mock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

pub const BASE_URL: &str = "https://ace.example.edu";

mock! {
    pub Http {}

    #[async_trait]
    impl HttpClient for Http {
        async fn execute(&self, request: HttpRequest) -> Result<HttpResponse>;
    }
}

pub fn student(profile_complete: bool) -> UserRecord {
    UserRecord {
        user_id: "user_8a2b".to_string(),
        email: "sam@university.edu".to_string(),
        name: "Sam".to_string(),
        picture: None,
        is_admin: false,
        profile_complete,
    }
}

pub fn me_response(profile_complete: bool) -> HttpResponse {
    HttpResponse::new(
        200,
        serde_json::to_string(&student(profile_complete)).expect("user json"),
    )
}

pub fn session_response(token: &str, profile_complete: bool) -> HttpResponse {
    let mut body = serde_json::to_value(student(profile_complete)).expect("user json");
    body["session_token"] = token.into();
    HttpResponse::new(200, body.to_string())
}

/// localStorage stand-in.
#[derive(Clone, Default)]
pub struct MemorySettings {
    data: Arc<Mutex<HashMap<String, String>>>,
}

impl MemorySettings {
    pub fn get(&self, key: &str) -> Option<String> {
        self.data.lock().expect("settings lock").get(key).cloned()
    }
}

#[async_trait]
impl SettingsStore for MemorySettings {
    async fn set_string(&self, key: &str, value: &str) -> Result<()> {
        self.data
            .lock()
            .expect("settings lock")
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn get_string(&self, key: &str) -> Result<Option<String>> {
        Ok(self.get(key))
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.data.lock().expect("settings lock").remove(key);
        Ok(())
    }

    async fn list_keys(&self) -> Result<Vec<String>> {
        Ok(self.data.lock().expect("settings lock").keys().cloned().collect())
    }

    async fn begin_transaction(&self) -> Result<Box<dyn SettingsTransaction>> {
        Ok(Box::new(MemoryTransaction {
            data: Arc::clone(&self.data),
            staged: Vec::new(),
        }))
    }
}

struct MemoryTransaction {
    data: Arc<Mutex<HashMap<String, String>>>,
    staged: Vec<(String, Option<String>)>,
}

#[async_trait]
impl SettingsTransaction for MemoryTransaction {
    async fn set_string(&mut self, key: &str, value: &str) -> Result<()> {
        self.staged.push((key.to_string(), Some(value.to_string())));
        Ok(())
    }

    async fn delete(&mut self, key: &str) -> Result<()> {
        self.staged.push((key.to_string(), None));
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        let mut data = self.data.lock().expect("settings lock");
        for (key, value) in self.staged {
            match value {
                Some(value) => data.insert(key, value),
                None => data.remove(&key),
            };
        }
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<()> {
        Ok(())
    }
}

/// Address bar stand-in recording every navigation.
pub struct RecordingNavigator {
    location: Mutex<Location>,
    pub navigations: Mutex<Vec<(String, NavigateOptions)>>,
}

impl RecordingNavigator {
    pub fn at(location: &str) -> Arc<Self> {
        Arc::new(Self {
            location: Mutex::new(Location::parse(location)),
            navigations: Mutex::new(Vec::new()),
        })
    }

    pub fn go(&self, location: &str) {
        *self.location.lock().expect("nav lock") = Location::parse(location);
    }

    pub fn history(&self) -> Vec<(String, NavigateOptions)> {
        self.navigations.lock().expect("nav lock").clone()
    }

    pub fn count_to(&self, path: &str) -> usize {
        self.history().iter().filter(|(p, _)| p == path).count()
    }
}

impl Navigator for RecordingNavigator {
    fn location(&self) -> Location {
        self.location.lock().expect("nav lock").clone()
    }

    fn navigate(&self, path: &str, options: NavigateOptions) -> Result<()> {
        *self.location.lock().expect("nav lock") = Location::parse(path);
        self.navigations
            .lock()
            .expect("nav lock")
            .push((path.to_string(), options));
        Ok(())
    }

    fn strip_fragment(&self) -> Result<()> {
        let mut location = self.location.lock().expect("nav lock");
        *location = location.without_fragment();
        Ok(())
    }
}

/// HTTP client that holds every request until the gate opens.
pub struct GatedHttp {
    pub gate: Arc<Notify>,
    pub calls: AtomicUsize,
    respond: Box<dyn Fn(&HttpRequest) -> Result<HttpResponse> + Send + Sync>,
}

impl GatedHttp {
    pub fn new(
        respond: impl Fn(&HttpRequest) -> Result<HttpResponse> + Send + Sync + 'static,
    ) -> Arc<Self> {
        Arc::new(Self {
            gate: Arc::new(Notify::new()),
            calls: AtomicUsize::new(0),
            respond: Box::new(respond),
        })
    }

    pub async fn wait_for_calls(&self, n: usize) {
        while self.calls.load(Ordering::SeqCst) < n {
            tokio::task::yield_now().await;
        }
    }

    pub fn release(&self) {
        self.gate.notify_waiters();
    }
}

#[async_trait]
impl HttpClient for GatedHttp {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
        let opened = self.gate.notified();
        self.calls.fetch_add(1, Ordering::SeqCst);
        opened.await;
        (self.respond)(&request)
    }
}

pub fn timeout_error() -> BridgeError {
    BridgeError::Timeout(5_000)
}

/// Wire an [`AuthContext`] over the doubles, optionally signed in.
pub async fn context(
    http: Arc<dyn HttpClient>,
    settings: MemorySettings,
    navigator: Arc<RecordingNavigator>,
    token: Option<(&str, bool)>,
) -> AuthContext {
    let store = Arc::new(SessionStore::new(Arc::new(settings)));
    store.hydrate().await.expect("hydrate");
    if let Some((token, complete)) = token {
        store
            .set(SessionToken::new(token), student(complete))
            .await
            .expect("seed session");
    }

    AuthContext::new(
        http,
        store,
        navigator,
        BASE_URL,
        RoutePaths::default(),
        EventBus::default(),
    )
}
