//! Scripted backend and in-memory bridges for the service tests.

use crate::client::AdvisorClient;
use bridge_traits::error::Result as BridgeResult;
use bridge_traits::storage::SettingsTransaction;
use bridge_traits::{
    HttpClient, HttpMethod, HttpRequest, HttpResponse, Location, NavigateOptions, Navigator,
    SettingsStore,
};
use bytes::Bytes;
use core_auth::{SessionToken, UserRecord};
use core_runtime::config::ClientConfig;
use std::collections::HashMap;
use std::ops::Deref;
use std::sync::{Arc, Mutex};

pub const BASE_URL: &str = "https://ace.example.edu";

pub fn student(profile_complete: bool) -> UserRecord {
    UserRecord {
        user_id: "user_31c9".to_string(),
        email: "riley@university.edu".to_string(),
        name: "Riley".to_string(),
        picture: None,
        is_admin: false,
        profile_complete,
    }
}

/// Canned responses keyed by method and path. Unknown routes answer 404.
#[derive(Default)]
pub struct Backend {
    routes: HashMap<(&'static str, String), (u16, String)>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl Backend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(mut self, method: HttpMethod, path: &str, status: u16, body: &str) -> Self {
        self.routes
            .insert((method.as_str(), path.to_string()), (status, body.to_string()));
        self
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().expect("requests lock").len()
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().expect("requests lock").clone()
    }

    pub fn last_body(&self) -> Option<Bytes> {
        self.requests().last().and_then(|request| request.body.clone())
    }
}

#[async_trait::async_trait]
impl HttpClient for Backend {
    async fn execute(&self, request: HttpRequest) -> BridgeResult<HttpResponse> {
        let path = request
            .url
            .strip_prefix(BASE_URL)
            .unwrap_or(&request.url)
            .to_string();
        let key = (request.method.as_str(), path);
        self.requests.lock().expect("requests lock").push(request);

        Ok(match self.routes.get(&key) {
            Some((status, body)) => HttpResponse::new(*status, body.clone()),
            None => HttpResponse::new(404, r#"{"detail":"Not Found"}"#),
        })
    }
}

#[derive(Clone, Default)]
pub struct MemorySettings {
    data: Arc<Mutex<HashMap<String, String>>>,
}

impl MemorySettings {
    pub fn raw(&self, key: &str) -> Option<String> {
        self.data.lock().expect("settings lock").get(key).cloned()
    }
}

#[async_trait::async_trait]
impl SettingsStore for MemorySettings {
    async fn set_string(&self, key: &str, value: &str) -> BridgeResult<()> {
        self.data
            .lock()
            .expect("settings lock")
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn get_string(&self, key: &str) -> BridgeResult<Option<String>> {
        Ok(self.raw(key))
    }

    async fn delete(&self, key: &str) -> BridgeResult<()> {
        self.data.lock().expect("settings lock").remove(key);
        Ok(())
    }

    async fn list_keys(&self) -> BridgeResult<Vec<String>> {
        Ok(self.data.lock().expect("settings lock").keys().cloned().collect())
    }

    async fn begin_transaction(&self) -> BridgeResult<Box<dyn SettingsTransaction>> {
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

#[async_trait::async_trait]
impl SettingsTransaction for MemoryTransaction {
    async fn set_string(&mut self, key: &str, value: &str) -> BridgeResult<()> {
        self.staged.push((key.to_string(), Some(value.to_string())));
        Ok(())
    }

    async fn delete(&mut self, key: &str) -> BridgeResult<()> {
        self.staged.push((key.to_string(), None));
        Ok(())
    }

    async fn commit(self: Box<Self>) -> BridgeResult<()> {
        let mut data = self.data.lock().expect("settings lock");
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

pub struct StaticNavigator {
    location: Mutex<Location>,
    pub history: Mutex<Vec<(String, NavigateOptions)>>,
}

impl StaticNavigator {
    pub fn at(location: &str) -> Self {
        Self {
            location: Mutex::new(Location::parse(location)),
            history: Mutex::new(Vec::new()),
        }
    }
}

impl Navigator for StaticNavigator {
    fn location(&self) -> Location {
        self.location.lock().expect("nav lock").clone()
    }

    fn navigate(&self, path: &str, options: NavigateOptions) -> BridgeResult<()> {
        *self.location.lock().expect("nav lock") = Location::parse(path);
        self.history
            .lock()
            .expect("nav lock")
            .push((path.to_string(), options));
        Ok(())
    }

    fn strip_fragment(&self) -> BridgeResult<()> {
        let mut location = self.location.lock().expect("nav lock");
        *location = location.without_fragment();
        Ok(())
    }
}

/// An [`AdvisorClient`] wired to a [`Backend`] with handles to every double.
pub struct TestClient {
    pub client: AdvisorClient,
    pub backend: Arc<Backend>,
    pub settings: MemorySettings,
    pub navigator: Arc<StaticNavigator>,
}

impl TestClient {
    pub async fn with_settings(backend: Backend, settings: MemorySettings) -> Self {
        let backend = Arc::new(backend);
        let navigator = Arc::new(StaticNavigator::at("/assistant"));
        let config = ClientConfig::builder()
            .api_base_url(BASE_URL)
            .http_client(backend.clone())
            .settings_store(Arc::new(settings.clone()))
            .navigator(navigator.clone())
            .build()
            .expect("config");

        let client = AdvisorClient::new(config).await.expect("client");
        Self {
            client,
            backend,
            settings,
            navigator,
        }
    }

    pub async fn new(backend: Backend) -> Self {
        Self::with_settings(backend, MemorySettings::default()).await
    }

    pub async fn signed_in(backend: Backend, profile_complete: bool) -> Self {
        let client = Self::new(backend).await;
        client
            .client
            .context()
            .store
            .set(SessionToken::new("session_riley"), student(profile_complete))
            .await
            .expect("seed session");
        client
    }
}

impl Deref for TestClient {
    type Target = AdvisorClient;

    fn deref(&self) -> &Self::Target {
        &self.client
    }
}
