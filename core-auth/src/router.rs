//! # App Router
//!
//! Top-level composition: decides, for the location in the address bar,
//! whether the OAuth callback runs, which guard protects the matched route,
//! or whether to bounce an unknown path to the fallback route.
//!
//! The callback check happens synchronously at render time and wins over
//! route matching, so `/assistant#session_id=...` is handled as a callback
//! rather than as a protected route that would redirect to login first.

use crate::callback::{is_callback, CallbackOutcome, OAuthCallbackHandler};
use crate::context::AuthContext;
use crate::guard::{GuardKind, MountOutcome, RouteGuard};
use bridge_traits::{Location, NavigateOptions};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, info, instrument, warn};

/// How a route is gated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouteClassification {
    Public,
    /// Signed in, any profile state (onboarding itself).
    ProtectedNoProfile,
    /// Signed in with a completed profile.
    ProtectedRequiresProfile,
    /// Signed in, completed profile, admin.
    ProtectedAdmin,
}

impl RouteClassification {
    pub fn guard_kind(&self) -> GuardKind {
        match self {
            RouteClassification::Public => GuardKind::Public,
            RouteClassification::ProtectedNoProfile => GuardKind::protected(),
            RouteClassification::ProtectedRequiresProfile => GuardKind::requiring_profile(),
            RouteClassification::ProtectedAdmin => GuardKind::admin(),
        }
    }
}

/// Exact-path route table.
#[derive(Debug, Clone)]
pub struct RouteTable {
    routes: HashMap<String, RouteClassification>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self {
            routes: HashMap::new(),
        }
    }

    pub fn route(mut self, path: impl Into<String>, classification: RouteClassification) -> Self {
        self.routes.insert(path.into(), classification);
        self
    }

    pub fn classify(&self, path: &str) -> Option<RouteClassification> {
        self.routes.get(normalize(path)).copied()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

impl Default for RouteTable {
    /// Landing, login and signup are public; onboarding needs a session;
    /// the assistant needs a completed profile; admin needs the admin flag.
    fn default() -> Self {
        Self::new()
            .route("/", RouteClassification::Public)
            .route("/login", RouteClassification::Public)
            .route("/signup", RouteClassification::Public)
            .route("/onboarding", RouteClassification::ProtectedNoProfile)
            .route("/assistant", RouteClassification::ProtectedRequiresProfile)
            .route("/admin", RouteClassification::ProtectedAdmin)
    }
}

fn normalize(path: &str) -> &str {
    match path.trim_end_matches('/') {
        "" => "/",
        trimmed => trimmed,
    }
}

/// What the router renders for a location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderDecision {
    OAuthCallback,
    Guarded {
        path: String,
        classification: RouteClassification,
    },
    Redirect {
        to: String,
    },
}

/// Result of one [`AppRouter::dispatch`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    Callback(CallbackOutcome),
    Guard {
        path: String,
        outcome: MountOutcome,
    },
    Redirected {
        to: String,
    },
}

pub struct AppRouter {
    context: AuthContext,
    table: RouteTable,
    callback: Arc<OAuthCallbackHandler>,
    mounted: Mutex<Option<Arc<RouteGuard>>>,
}

impl AppRouter {
    pub fn new(context: AuthContext, table: RouteTable) -> Self {
        let callback = Arc::new(OAuthCallbackHandler::new(context.clone()));
        Self {
            context,
            table,
            callback,
            mounted: Mutex::new(None),
        }
    }

    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    /// Decide synchronously what `location` renders.
    pub fn render(&self, location: &Location) -> RenderDecision {
        if is_callback(location) {
            return RenderDecision::OAuthCallback;
        }

        match self.table.classify(&location.path) {
            Some(classification) => RenderDecision::Guarded {
                path: normalize(&location.path).to_string(),
                classification,
            },
            None => RenderDecision::Redirect {
                to: self.context.routes.fallback.clone(),
            },
        }
    }

    /// Run the navigation for the current location to a terminal state.
    ///
    /// Any guard mounted by a previous dispatch is unmounted first.
    #[instrument(skip(self))]
    pub async fn dispatch(&self) -> DispatchOutcome {
        let location = self.context.navigator.location();
        self.unmount_current();

        match self.render(&location) {
            RenderDecision::OAuthCallback => {
                debug!("Rendering OAuth callback");
                DispatchOutcome::Callback(self.callback.handle().await)
            }
            RenderDecision::Guarded {
                path,
                classification,
            } => {
                let guard = Arc::new(RouteGuard::new(
                    self.context.clone(),
                    path.clone(),
                    classification.guard_kind(),
                ));
                *self.mounted_slot() = Some(Arc::clone(&guard));

                let outcome = guard.mount().await;
                DispatchOutcome::Guard { path, outcome }
            }
            RenderDecision::Redirect { to } => {
                info!(from = %location.path, to = %to, "Unknown route");
                if let Err(e) = self
                    .context
                    .navigator
                    .navigate(&to, NavigateOptions::replace())
                {
                    warn!(error = %e, "Fallback navigation failed");
                }
                DispatchOutcome::Redirected { to }
            }
        }
    }

    /// The guard for the current route, if one is mounted.
    pub fn current_guard(&self) -> Option<Arc<RouteGuard>> {
        self.mounted_slot().clone()
    }

    /// Unmount the current guard, discarding its pending verification.
    pub fn unmount_current(&self) {
        if let Some(guard) = self.mounted_slot().take() {
            guard.unmount();
        }
    }

    fn mounted_slot(&self) -> std::sync::MutexGuard<'_, Option<Arc<RouteGuard>>> {
        self.mounted.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for AppRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppRouter")
            .field("routes", &self.table.len())
            .field("mounted", &self.current_guard().map(|g| g.path().to_string()))
            .finish()
    }
}
