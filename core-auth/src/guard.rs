//! # Route Guards
//!
//! Per-mount gatekeepers deciding whether a routed subtree may render.
//!
//! ## State machines
//!
//! Protected routes:
//!
//! ```text
//! Loading ──► Authorized
//!         ├─► RedirectLogin
//!         ├─► RedirectOnboarding
//!         └─► RedirectMain        (admin routes, non-admin user)
//! ```
//!
//! Public routes (login, signup, landing):
//!
//! ```text
//! Loading ──► Checked
//!         ├─► RedirectMain
//!         └─► RedirectOnboarding
//! ```
//!
//! ## Mount epochs
//!
//! Each [`RouteGuard::mount`] takes a fresh epoch before it starts verifying.
//! The verdict is only applied if the epoch is still current and the guard
//! is still mounted; otherwise the result is dropped without touching state
//! or navigating. That includes a 401 from the backend: the rejected session
//! is only cleared by a mount that is still current. Nothing is cached
//! between mounts.

use crate::context::AuthContext;
use crate::gateway::redirect;
use crate::verify::{SessionVerdict, SessionVerifier, ME_PATH};
use bridge_traits::NavigateOptions;
use core_runtime::config::RoutePaths;
use core_runtime::events::{CoreEvent, RouteEvent};
use std::sync::{Mutex, PoisonError};
use tokio::sync::watch;
use tracing::{debug, info, instrument};

/// Which variant of guard protects a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardKind {
    Protected {
        /// Incomplete profiles are sent to onboarding.
        requires_profile: bool,
        /// Non-admins are sent to the main route.
        requires_admin: bool,
    },
    Public,
}

impl GuardKind {
    pub fn protected() -> Self {
        GuardKind::Protected {
            requires_profile: false,
            requires_admin: false,
        }
    }

    pub fn requiring_profile() -> Self {
        GuardKind::Protected {
            requires_profile: true,
            requires_admin: false,
        }
    }

    pub fn admin() -> Self {
        GuardKind::Protected {
            requires_profile: true,
            requires_admin: true,
        }
    }

    /// Map a verification verdict onto this guard's terminal state.
    pub fn resolve(&self, verdict: &SessionVerdict) -> GuardState {
        match (self, verdict) {
            (GuardKind::Public, SessionVerdict::Unauthenticated | SessionVerdict::Rejected { .. }) => {
                GuardState::Checked
            }
            (GuardKind::Public, SessionVerdict::Authorized(_)) => GuardState::RedirectMain,
            (GuardKind::Public, SessionVerdict::NeedsOnboarding(_)) => {
                GuardState::RedirectOnboarding
            }

            (
                GuardKind::Protected { .. },
                SessionVerdict::Unauthenticated | SessionVerdict::Rejected { .. },
            ) => GuardState::RedirectLogin,
            (
                GuardKind::Protected {
                    requires_profile: true,
                    ..
                },
                SessionVerdict::NeedsOnboarding(_),
            ) => GuardState::RedirectOnboarding,
            (
                GuardKind::Protected {
                    requires_admin: true,
                    ..
                },
                SessionVerdict::Authorized(user) | SessionVerdict::NeedsOnboarding(user),
            ) if !user.is_admin => GuardState::RedirectMain,
            (GuardKind::Protected { .. }, _) => GuardState::Authorized,
        }
    }
}

/// Observable guard state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardState {
    Loading,
    /// Protected subtree may render.
    Authorized,
    /// Public subtree may render.
    Checked,
    RedirectLogin,
    RedirectOnboarding,
    RedirectMain,
}

impl GuardState {
    /// Whether the guarded subtree renders in this state.
    pub fn renders_children(&self) -> bool {
        matches!(self, GuardState::Authorized | GuardState::Checked)
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, GuardState::Loading)
    }

    /// Route this state navigates to, if any.
    pub fn redirect_target<'a>(&self, routes: &'a RoutePaths) -> Option<&'a str> {
        match self {
            GuardState::RedirectLogin => Some(&routes.login),
            GuardState::RedirectOnboarding => Some(&routes.onboarding),
            GuardState::RedirectMain => Some(&routes.main),
            _ => None,
        }
    }
}

/// Result of one [`RouteGuard::mount`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MountOutcome {
    /// The verdict was applied and this state reached.
    Applied(GuardState),
    /// The guard was unmounted or re-mounted before the verdict arrived.
    Superseded,
}

#[derive(Debug, Default)]
struct MountTracker {
    epoch: u64,
    active: bool,
}

pub struct RouteGuard {
    context: AuthContext,
    verifier: SessionVerifier,
    path: String,
    kind: GuardKind,
    tracker: Mutex<MountTracker>,
    state: watch::Sender<GuardState>,
}

impl RouteGuard {
    pub fn new(context: AuthContext, path: impl Into<String>, kind: GuardKind) -> Self {
        let verifier = SessionVerifier::new(context.gateway.clone());
        let (state, _) = watch::channel(GuardState::Loading);
        Self {
            context,
            verifier,
            path: path.into(),
            kind,
            tracker: Mutex::new(MountTracker::default()),
            state,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn kind(&self) -> GuardKind {
        self.kind
    }

    pub fn state(&self) -> GuardState {
        *self.state.borrow()
    }

    /// Watch state transitions, e.g. to re-render when the guard resolves.
    pub fn subscribe(&self) -> watch::Receiver<GuardState> {
        self.state.subscribe()
    }

    /// Verify the session and resolve the guard.
    ///
    /// Always starts from [`GuardState::Loading`] with a new server check.
    #[instrument(skip(self), fields(path = %self.path, kind = ?self.kind))]
    pub async fn mount(&self) -> MountOutcome {
        let epoch = {
            let mut tracker = self.tracker();
            tracker.epoch += 1;
            tracker.active = true;
            tracker.epoch
        };
        self.state.send_replace(GuardState::Loading);

        let verdict = self.verifier.verify_session().await;
        let next = self.kind.resolve(&verdict);

        if let SessionVerdict::Rejected { generation } = verdict {
            if !self.is_current(epoch) {
                debug!(epoch, "Discarding superseded rejection");
                return MountOutcome::Superseded;
            }
            self.context.gateway.expire_session(generation, ME_PATH).await;
        }

        let redirected_to = {
            let tracker = self.tracker();
            if tracker.epoch != epoch || !tracker.active {
                debug!(epoch, current = tracker.epoch, "Discarding superseded verdict");
                return MountOutcome::Superseded;
            }

            self.state.send_replace(next);
            match next.redirect_target(&self.context.routes) {
                Some(target) => {
                    redirect(
                        self.context.navigator.as_ref(),
                        target,
                        NavigateOptions::replace(),
                    );
                    Some(target.to_string())
                }
                None => None,
            }
        };

        let event = match redirected_to {
            Some(to) => {
                info!(to = %to, state = ?next, "Guard redirected");
                RouteEvent::Redirected {
                    from: self.path.clone(),
                    to,
                }
            }
            None => {
                debug!(state = ?next, "Guard resolved");
                RouteEvent::Authorized {
                    path: self.path.clone(),
                }
            }
        };
        self.context.events.emit(CoreEvent::Route(event)).ok();

        MountOutcome::Applied(next)
    }

    /// Detach the guard. Any verification still in flight is discarded.
    pub fn unmount(&self) {
        let mut tracker = self.tracker();
        tracker.epoch += 1;
        tracker.active = false;
    }

    pub fn is_mounted(&self) -> bool {
        self.tracker().active
    }

    fn is_current(&self, epoch: u64) -> bool {
        let tracker = self.tracker();
        tracker.epoch == epoch && tracker.active
    }

    fn tracker(&self) -> std::sync::MutexGuard<'_, MountTracker> {
        self.tracker.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for RouteGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteGuard")
            .field("path", &self.path)
            .field("kind", &self.kind)
            .field("state", &self.state())
            .finish()
    }
}
