//! # Authentication Module
//!
//! Session handling and route authorization for the advising client.
//!
//! ## Overview
//!
//! - [`SessionStore`]: the current session token and cached user, mirrored
//!   into durable storage
//! - [`AuthGateway`]: the one outbound channel; attaches the bearer token and
//!   turns any 401 into a single sign-out and redirect to login
//! - [`RouteGuard`]: per-mount server verification for protected and public
//!   routes
//! - [`OAuthCallbackHandler`]: one-time identifier exchange after a
//!   third-party sign-in
//! - [`AppRouter`]: callback detection, route matching and guard lifecycle
//! - [`AuthManager`]: login, signup and logout
//!
//! All components share state only through the [`SessionStore`], wired
//! together once in an [`AuthContext`].

pub mod callback;
pub mod context;
pub mod error;
pub mod gateway;
pub mod guard;
pub mod manager;
pub mod router;
pub mod session_store;
pub mod types;
pub mod verify;

#[cfg(test)]
mod test_support;

pub use callback::{is_callback, CallbackOutcome, OAuthCallbackHandler};
pub use context::AuthContext;
pub use error::{error_detail, AuthError, Result};
pub use gateway::AuthGateway;
pub use guard::{GuardKind, GuardState, MountOutcome, RouteGuard};
pub use manager::{AuthManager, SignInOutcome};
pub use router::{AppRouter, DispatchOutcome, RenderDecision, RouteClassification, RouteTable};
pub use session_store::{RequestCredential, SessionStore};
pub use types::{AuthResponse, Session, SessionToken, UserRecord};
pub use verify::{SessionVerdict, SessionVerifier};
