//! # Auth Gateway
//!
//! The single outbound channel to the advising backend.
//!
//! Every request sent through [`AuthGateway::execute`] carries the current
//! session token as a bearer credential, and every 401 that comes back is
//! handled in one place: the session is invalidated and the app is sent to
//! the login page. Only the response that actually ends a session does this;
//! later 401s for the same session, or 401s for a session that has since been
//! replaced, just fail their own request. A 401 for a request that carried no
//! token has no session to end and only redirects.
//!
//! Route guards use [`AuthGateway::execute_deferred`] so a rejected
//! verification only takes effect while the guard is still mounted.
//!
//! Login, signup and the OAuth exchange go through
//! [`AuthGateway::execute_public`] instead, where a 401 means bad credentials
//! and must not clear anything.

use crate::error::{AuthError, Result};
use crate::session_store::{RequestCredential, SessionStore};
use bridge_traits::{HttpClient, HttpMethod, HttpRequest, HttpResponse, NavigateOptions, Navigator};
use core_runtime::events::{AuthEvent, CoreEvent, EventBus};
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

#[derive(Clone)]
pub struct AuthGateway {
    http: Arc<dyn HttpClient>,
    store: Arc<SessionStore>,
    navigator: Arc<dyn Navigator>,
    base_url: String,
    login_path: String,
    events: EventBus,
    default_timeout: Option<Duration>,
}

impl AuthGateway {
    pub fn new(
        http: Arc<dyn HttpClient>,
        store: Arc<SessionStore>,
        navigator: Arc<dyn Navigator>,
        api_base_url: impl Into<String>,
        login_path: String,
        events: EventBus,
    ) -> Self {
        let base_url = api_base_url.into().trim_end_matches('/').to_string();
        Self {
            http,
            store,
            navigator,
            base_url,
            login_path,
            events,
            default_timeout: None,
        }
    }

    /// Timeout applied to requests that do not set their own.
    pub fn with_default_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = Some(timeout);
        self
    }

    /// Absolute URL for a backend path such as `/api/auth/me`.
    pub fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    pub fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    /// Send an authenticated request.
    ///
    /// Non-2xx statuses other than 401 are returned as responses so callers
    /// can read validation details. A 401 always yields
    /// [`AuthError::Unauthenticated`].
    #[instrument(skip(self, request), fields(method = request.method.as_str(), url = %request.url))]
    pub async fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
        let path = self.backend_path(&request.url);
        let (response, credential) = self.send_authorized(request).await?;

        if response.is_unauthorized() {
            self.handle_unauthorized(&credential, &path).await;
            return Err(AuthError::Unauthenticated);
        }

        Ok(response)
    }

    /// Send an authenticated request and hand a 401 back untouched.
    ///
    /// The credential the request went out with is returned alongside the
    /// response. A caller that still wants the result passes its generation
    /// to [`AuthGateway::expire_session`]; nothing is cleared or navigated
    /// here.
    #[instrument(skip(self, request), fields(method = request.method.as_str(), url = %request.url))]
    pub async fn execute_deferred(
        &self,
        request: HttpRequest,
    ) -> Result<(HttpResponse, RequestCredential)> {
        self.send_authorized(request).await
    }

    /// Clear the session rejected at `generation`, without navigating.
    ///
    /// Returns `true` when this call ended the session. A `SessionExpired`
    /// event is emitted in that case only.
    pub async fn expire_session(&self, generation: u64, path: &str) -> bool {
        if !self.store.invalidate_if_current(generation).await {
            debug!(path, "401 for a session that is already gone");
            return false;
        }

        info!(path, "Session rejected by backend");
        self.events
            .emit(CoreEvent::Auth(AuthEvent::SessionExpired {
                path: path.to_string(),
            }))
            .ok();
        true
    }

    /// Send a request without credential or 401 handling.
    #[instrument(skip(self, request), fields(method = request.method.as_str(), url = %request.url))]
    pub async fn execute_public(&self, request: HttpRequest) -> Result<HttpResponse> {
        let request = self.apply_default_timeout(request);
        self.http
            .execute(request)
            .await
            .map_err(AuthError::network)
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self.execute(HttpRequest::get(self.url(path))).await?;
        Self::parse(response)
    }

    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send_json(HttpMethod::Post, path, body).await
    }

    pub async fn put_json<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send_json(HttpMethod::Put, path, body).await
    }

    /// `DELETE` a resource, discarding the response body.
    pub async fn delete(&self, path: &str) -> Result<()> {
        let response = self
            .execute(HttpRequest::new(HttpMethod::Delete, self.url(path)))
            .await?;
        if !response.is_success() {
            return Err(AuthError::from_response(&response));
        }
        Ok(())
    }

    async fn send_json<B, T>(&self, method: HttpMethod, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = HttpRequest::new(method, self.url(path))
            .json(body)
            .map_err(AuthError::invalid_response)?;
        let response = self.execute(request).await?;
        Self::parse(response)
    }

    fn parse<T: DeserializeOwned>(response: HttpResponse) -> Result<T> {
        if !response.is_success() {
            return Err(AuthError::from_response(&response));
        }
        response.json().map_err(AuthError::invalid_response)
    }

    fn apply_default_timeout(&self, request: HttpRequest) -> HttpRequest {
        match (request.timeout, self.default_timeout) {
            (None, Some(timeout)) => request.timeout(timeout),
            _ => request,
        }
    }

    async fn send_authorized(
        &self,
        request: HttpRequest,
    ) -> Result<(HttpResponse, RequestCredential)> {
        let credential = self.store.credential();

        let mut request = self.apply_default_timeout(request);
        if let Some(token) = &credential.token {
            if !request.has_authorization() {
                request = request.bearer_token(token.as_str());
            }
        }

        let response = self
            .http
            .execute(request)
            .await
            .map_err(AuthError::network)?;
        Ok((response, credential))
    }

    async fn handle_unauthorized(&self, credential: &RequestCredential, path: &str) {
        match credential.token {
            Some(_) => {
                if !self.expire_session(credential.generation, path).await {
                    return;
                }
            }
            None => debug!(path, "401 without a credential"),
        }

        redirect(
            self.navigator.as_ref(),
            &self.login_path,
            NavigateOptions::replace(),
        );
    }

    fn backend_path(&self, url: &str) -> String {
        url.strip_prefix(&self.base_url)
            .unwrap_or(url)
            .to_string()
    }
}

impl std::fmt::Debug for AuthGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthGateway")
            .field("base_url", &self.base_url)
            .field("login_path", &self.login_path)
            .field("default_timeout", &self.default_timeout)
            .finish()
    }
}

/// Navigate to `target` unless the address bar already shows it.
///
/// Returns whether a navigation was issued. Navigation failures are logged,
/// not propagated; there is nothing a caller could do about them.
pub(crate) fn redirect(navigator: &dyn Navigator, target: &str, options: NavigateOptions) -> bool {
    let current = navigator.location();
    if current.path == target && current.fragment.is_none() {
        debug!(target, "Already at redirect target");
        return false;
    }

    match navigator.navigate(target, options) {
        Ok(()) => true,
        Err(e) => {
            warn!(target, error = %e, "Navigation failed");
            false
        }
    }
}
