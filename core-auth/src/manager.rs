//! # Authentication Manager
//!
//! Credential flows that start from a form rather than from a route: login,
//! signup and logout.
//!
//! ## Overview
//!
//! - Login and signup post credentials over the gateway's public channel, so
//!   a 401 for a bad password surfaces as [`AuthError::Validation`] and never
//!   disturbs an existing session.
//! - On success the session is stored, a `SignedIn` event is emitted and the
//!   user is sent to the assistant or, with an incomplete profile, to
//!   onboarding.
//! - Logout is best-effort on the server and unconditional locally: the
//!   session is cleared and the user lands on the login page even if the
//!   backend call fails or times out.
//!
//! ## Usage
//!
//! ```no_run
//! use core_auth::{AuthContext, AuthManager};
//! # async fn example(context: AuthContext) -> core_auth::Result<()> {
//! let manager = AuthManager::new(context);
//!
//! match manager.login("jordan@university.edu", "hunter22").await {
//!     Ok(outcome) => println!("welcome {}, going to {}", outcome.user.name, outcome.destination),
//!     Err(e) if e.is_validation() => println!("{}", e),
//!     Err(e) => return Err(e),
//! }
//!
//! manager.logout().await;
//! # Ok(())
//! # }
//! ```

use crate::context::AuthContext;
use crate::error::{AuthError, Result};
use crate::gateway::redirect;
use crate::types::{AuthResponse, LoginRequest, SignupRequest, UserRecord};
use bridge_traits::{HttpRequest, NavigateOptions};
use core_runtime::config::DEFAULT_LOGOUT_TIMEOUT;
use core_runtime::events::{AuthEvent, CoreEvent, SignInMethod};
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

const LOGIN_PATH: &str = "/api/auth/login";
const SIGNUP_PATH: &str = "/api/auth/signup";
const LOGOUT_PATH: &str = "/api/auth/logout";

/// A completed login or signup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignInOutcome {
    pub user: UserRecord,
    /// Route the user was sent to.
    pub destination: String,
}

pub struct AuthManager {
    context: AuthContext,
    logout_timeout: Duration,
}

impl AuthManager {
    pub fn new(context: AuthContext) -> Self {
        Self {
            context,
            logout_timeout: DEFAULT_LOGOUT_TIMEOUT,
        }
    }

    /// Upper bound for the server-side part of [`logout`](Self::logout).
    pub fn with_logout_timeout(mut self, timeout: Duration) -> Self {
        self.logout_timeout = timeout;
        self
    }

    pub fn context(&self) -> &AuthContext {
        &self.context
    }

    /// Sign in with email and password.
    #[instrument(skip_all)]
    pub async fn login(&self, email: &str, password: &str) -> Result<SignInOutcome> {
        let email = email.trim();
        if email.is_empty() || password.is_empty() {
            return Err(missing_field("Email and password are required"));
        }

        let response = self
            .authenticate(LOGIN_PATH, &LoginRequest { email, password })
            .await?;
        self.establish(response, SignInMethod::Password).await
    }

    /// Create an account and sign in.
    ///
    /// A duplicate email comes back as [`AuthError::Validation`] with the
    /// backend's message.
    #[instrument(skip_all)]
    pub async fn signup(&self, email: &str, password: &str, name: &str) -> Result<SignInOutcome> {
        let email = email.trim();
        let name = name.trim();
        if email.is_empty() || password.is_empty() || name.is_empty() {
            return Err(missing_field("Name, email and password are required"));
        }

        let response = self
            .authenticate(
                SIGNUP_PATH,
                &SignupRequest {
                    email,
                    password,
                    name,
                },
            )
            .await?;
        self.establish(response, SignInMethod::Signup).await
    }

    /// End the session.
    ///
    /// The backend is told first, bounded by the logout timeout; whatever
    /// happens there, the local session is cleared and the user is sent to
    /// the login page.
    #[instrument(skip(self))]
    pub async fn logout(&self) {
        if let Some(token) = self.context.store.credential().token {
            let gateway = &self.context.gateway;
            let request = HttpRequest::post(gateway.url(LOGOUT_PATH))
                .bearer_token(token.as_str())
                .timeout(self.logout_timeout);

            match gateway.execute_public(request).await {
                Ok(response) if response.is_success() => debug!("Server session invalidated"),
                Ok(response) => warn!(status = response.status, "Logout rejected by backend"),
                Err(e) => warn!(error = %e, "Logout request failed"),
            }
        }

        if let Err(e) = self.context.store.clear().await {
            warn!(error = %e, "Failed to delete persisted session");
        }

        info!("Signed out");
        self.context
            .events
            .emit(CoreEvent::Auth(AuthEvent::SignedOut {
                reason: "logout".to_string(),
            }))
            .ok();
        redirect(
            self.context.navigator.as_ref(),
            &self.context.routes.login,
            NavigateOptions::replace(),
        );
    }

    /// The cached user. Advisory only; guards re-verify with the backend.
    pub fn current_user(&self) -> Option<UserRecord> {
        self.context.store.cached_user()
    }

    /// Whether a token is stored locally.
    pub fn is_authenticated(&self) -> bool {
        self.context.store.has_token()
    }

    async fn authenticate<B: Serialize>(&self, path: &str, body: &B) -> Result<AuthResponse> {
        let gateway = &self.context.gateway;
        let request = HttpRequest::post(gateway.url(path))
            .json(body)
            .map_err(AuthError::invalid_response)?;

        let response = gateway.execute_public(request).await?;
        if !response.is_success() {
            let error = AuthError::from_response(&response);
            warn!(status = response.status, error = %error, "Credentials rejected");
            return Err(error);
        }
        response.json().map_err(AuthError::invalid_response)
    }

    async fn establish(&self, response: AuthResponse, method: SignInMethod) -> Result<SignInOutcome> {
        let AuthResponse {
            session_token,
            user,
        } = response;

        self.context.store.set(session_token, user.clone()).await?;

        let routes = &self.context.routes;
        let destination = if user.profile_complete {
            routes.main.clone()
        } else {
            routes.onboarding.clone()
        };

        info!(user_id = %user.user_id, method = ?method, "Signed in");
        self.context
            .events
            .emit(CoreEvent::Auth(AuthEvent::SignedIn {
                user_id: user.user_id.clone(),
                method,
                profile_complete: user.profile_complete,
            }))
            .ok();
        redirect(
            self.context.navigator.as_ref(),
            &destination,
            NavigateOptions::push(),
        );

        Ok(SignInOutcome { user, destination })
    }
}

fn missing_field(detail: &str) -> AuthError {
    AuthError::Validation {
        status: 400,
        detail: detail.to_string(),
    }
}

impl std::fmt::Debug for AuthManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthManager")
            .field("authenticated", &self.is_authenticated())
            .field("logout_timeout", &self.logout_timeout)
            .finish()
    }
}
