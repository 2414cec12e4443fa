//! # OAuth Callback
//!
//! Completes a third-party sign-in. The identity provider sends the browser
//! back to the app with a one-time identifier in the fragment:
//!
//! ```text
//! https://ace.example.edu/assistant#session_id=<opaque-one-time-id>
//! ```
//!
//! The handler exchanges that identifier for a session token exactly once,
//! removes it from the address bar whatever the outcome, and routes the user
//! on. The handler latches onto an identifier before the exchange starts:
//!
//! - a second mount while that exchange is running does nothing and leaves
//!   the routing to the first;
//! - a second mount after the fragment was already stripped does nothing;
//! - the same identifier arriving again after its exchange settled is a
//!   reuse, and fails closed to the login page.

use crate::context::AuthContext;
use crate::error::AuthError;
use crate::gateway::redirect;
use crate::types::{AuthResponse, ExchangeRequest};
use bridge_traits::{HttpRequest, Location, NavigateOptions};
use core_runtime::events::{AuthEvent, CoreEvent, SignInMethod};
use std::sync::{Mutex, PoisonError};
use tracing::{debug, info, instrument, warn};

/// Fragment key carrying the one-time identifier.
pub const SESSION_ID_KEY: &str = "session_id";

/// Path of the exchange endpoint.
pub const EXCHANGE_PATH: &str = "/api/auth/session";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackOutcome {
    /// Session stored; the user was sent to `destination`.
    Completed { destination: String },
    /// The exchange failed; the user was sent to `destination`.
    Failed { destination: String },
    /// The fragment had no usable identifier. No request was made.
    MissingIdentifier,
    /// This callback is already being (or has been) handled by an earlier
    /// mount. Nothing was done.
    AlreadyConsumed,
    /// The identifier was exchanged before. The fragment was removed and the
    /// user was sent to `destination`.
    Reused { destination: String },
}

impl CallbackOutcome {
    pub fn destination(&self) -> Option<&str> {
        match self {
            CallbackOutcome::Completed { destination }
            | CallbackOutcome::Failed { destination }
            | CallbackOutcome::Reused { destination } => Some(destination),
            _ => None,
        }
    }
}

/// Whether `location` is an OAuth return, i.e. its fragment names a
/// `session_id`. Cheap and synchronous so routing can check it first.
pub fn is_callback(location: &Location) -> bool {
    location
        .fragment
        .as_deref()
        .map(|fragment| fragment_pairs(fragment).any(|(key, _)| key == SESSION_ID_KEY))
        .unwrap_or(false)
}

/// The non-empty identifier in `fragment`, if any.
pub fn session_id(fragment: &str) -> Option<String> {
    fragment_pairs(fragment)
        .find(|(key, _)| key == SESSION_ID_KEY)
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn fragment_pairs(fragment: &str) -> impl Iterator<Item = (String, String)> {
    serde_urlencoded::from_str::<Vec<(String, String)>>(fragment)
        .unwrap_or_default()
        .into_iter()
}

/// The identifier this handler last took on, and whether its exchange has
/// settled.
#[derive(Debug, Default)]
struct Latch {
    identifier: Option<String>,
    settled: bool,
}

enum Claim {
    Fresh,
    InFlight,
    Settled,
}

pub struct OAuthCallbackHandler {
    context: AuthContext,
    latch: Mutex<Latch>,
}

impl OAuthCallbackHandler {
    pub fn new(context: AuthContext) -> Self {
        Self {
            context,
            latch: Mutex::new(Latch::default()),
        }
    }

    /// Handle the callback at the navigator's current location.
    #[instrument(skip(self))]
    pub async fn handle(&self) -> CallbackOutcome {
        let location = self.context.navigator.location();

        if !is_callback(&location) && self.latch().identifier.is_some() {
            debug!(path = %location.path, "Callback already handled by an earlier mount");
            return CallbackOutcome::AlreadyConsumed;
        }

        let Some(identifier) = location.fragment.as_deref().and_then(session_id) else {
            warn!(path = %location.path, "OAuth callback without identifier");
            self.strip_fragment();
            redirect(
                self.context.navigator.as_ref(),
                &self.context.routes.login,
                NavigateOptions::replace(),
            );
            return CallbackOutcome::MissingIdentifier;
        };

        match self.claim(&identifier) {
            Claim::Fresh => {}
            Claim::InFlight => {
                debug!("OAuth exchange already in flight");
                return CallbackOutcome::AlreadyConsumed;
            }
            Claim::Settled => return self.reject_reuse(),
        }

        let outcome = match self.exchange(&identifier).await {
            Ok(response) => self.complete(response).await,
            Err(e) => self.fail(e),
        };
        self.latch().settled = true;
        outcome
    }

    /// Whether `identifier` has been handed to the exchange already.
    pub fn is_consumed(&self, identifier: &str) -> bool {
        self.latch().identifier.as_deref() == Some(identifier)
    }

    fn claim(&self, identifier: &str) -> Claim {
        let mut latch = self.latch();
        match latch.identifier.as_deref() {
            Some(current) if current == identifier && latch.settled => Claim::Settled,
            Some(current) if current == identifier => Claim::InFlight,
            _ => {
                latch.identifier = Some(identifier.to_string());
                latch.settled = false;
                Claim::Fresh
            }
        }
    }

    fn reject_reuse(&self) -> CallbackOutcome {
        warn!("OAuth identifier reused");
        self.strip_fragment();

        let destination = self.context.routes.login.clone();
        redirect(
            self.context.navigator.as_ref(),
            &destination,
            NavigateOptions::replace(),
        );
        CallbackOutcome::Reused { destination }
    }

    async fn exchange(&self, identifier: &str) -> Result<AuthResponse, AuthError> {
        let gateway = &self.context.gateway;
        let request = HttpRequest::post(gateway.url(EXCHANGE_PATH))
            .json(&ExchangeRequest {
                session_id: identifier,
            })
            .map_err(AuthError::invalid_response)?;

        let response = gateway.execute_public(request).await?;
        if !response.is_success() {
            return Err(AuthError::from_response(&response));
        }
        response.json().map_err(AuthError::invalid_response)
    }

    async fn complete(&self, response: AuthResponse) -> CallbackOutcome {
        let AuthResponse {
            session_token,
            user,
        } = response;
        let user_id = user.user_id.clone();
        let profile_complete = user.profile_complete;

        if let Err(e) = self.context.store.set(session_token, user).await {
            return self.fail(e);
        }
        self.strip_fragment();

        let routes = &self.context.routes;
        let destination = if profile_complete {
            routes.main.clone()
        } else {
            routes.onboarding.clone()
        };
        self.context
            .navigator
            .navigate(&destination, NavigateOptions::replace())
            .unwrap_or_else(|e| warn!(error = %e, "Post-callback navigation failed"));

        info!(user_id = %user_id, profile_complete, "OAuth sign-in completed");
        self.context
            .events
            .emit(CoreEvent::Auth(AuthEvent::SignedIn {
                user_id,
                method: SignInMethod::OAuth,
                profile_complete,
            }))
            .ok();

        CallbackOutcome::Completed { destination }
    }

    fn fail(&self, error: AuthError) -> CallbackOutcome {
        warn!(error = %error, "OAuth exchange failed");
        self.strip_fragment();

        let destination = self.context.routes.login.clone();
        redirect(
            self.context.navigator.as_ref(),
            &destination,
            NavigateOptions::replace(),
        );
        self.context
            .events
            .emit(CoreEvent::Auth(AuthEvent::CallbackFailed {
                message: error.to_string(),
            }))
            .ok();

        CallbackOutcome::Failed { destination }
    }

    fn strip_fragment(&self) {
        if let Err(e) = self.context.navigator.strip_fragment() {
            warn!(error = %e, "Failed to strip callback fragment");
        }
    }

    fn latch(&self) -> std::sync::MutexGuard<'_, Latch> {
        self.latch.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for OAuthCallbackHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OAuthCallbackHandler")
            .field("latch", &*self.latch())
            .finish()
    }
}
