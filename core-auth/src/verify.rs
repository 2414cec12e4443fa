//! Server-side session verification.
//!
//! A locally stored token only says the user signed in at some point. Before
//! a guard lets protected content render it asks the backend who the token
//! belongs to; the cached user record is never trusted for this.

use crate::error::AuthError;
use crate::gateway::AuthGateway;
use crate::types::UserRecord;
use bridge_traits::HttpRequest;
use std::sync::Arc;
use tracing::{debug, warn};

/// Path of the identity endpoint.
pub const ME_PATH: &str = "/api/auth/me";

/// What the backend said about the stored session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionVerdict {
    /// Valid session with a completed profile.
    Authorized(UserRecord),
    /// Valid session, onboarding not yet submitted.
    NeedsOnboarding(UserRecord),
    /// No token, or the backend could not be reached.
    Unauthenticated,
    /// The backend answered 401 for the token of this store generation.
    /// Nothing has been cleared yet.
    Rejected { generation: u64 },
}

impl SessionVerdict {
    pub fn user(&self) -> Option<&UserRecord> {
        match self {
            SessionVerdict::Authorized(user) | SessionVerdict::NeedsOnboarding(user) => Some(user),
            SessionVerdict::Unauthenticated | SessionVerdict::Rejected { .. } => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.user().is_some()
    }
}

#[derive(Debug, Clone)]
pub struct SessionVerifier {
    gateway: Arc<AuthGateway>,
}

impl SessionVerifier {
    pub fn new(gateway: Arc<AuthGateway>) -> Self {
        Self { gateway }
    }

    /// Ask the backend whether the stored session is valid.
    ///
    /// Without a stored token no request is made. Any failure, including a
    /// network error, is treated as unauthenticated. This call never clears
    /// the store or navigates; a 401 is reported as
    /// [`SessionVerdict::Rejected`] for the caller to act on.
    pub async fn verify_session(&self) -> SessionVerdict {
        if !self.gateway.store().has_token() {
            debug!("No stored token, skipping verification");
            return SessionVerdict::Unauthenticated;
        }

        let request = HttpRequest::get(self.gateway.url(ME_PATH));
        let (response, credential) = match self.gateway.execute_deferred(request).await {
            Ok(sent) => sent,
            Err(e) => {
                warn!(error = %e, "Session verification failed");
                return SessionVerdict::Unauthenticated;
            }
        };

        if response.is_unauthorized() && credential.token.is_some() {
            return SessionVerdict::Rejected {
                generation: credential.generation,
            };
        }
        if !response.is_success() {
            warn!(status = response.status, "Session verification failed");
            return SessionVerdict::Unauthenticated;
        }

        match response.json::<UserRecord>() {
            Ok(user) if user.profile_complete => SessionVerdict::Authorized(user),
            Ok(user) => SessionVerdict::NeedsOnboarding(user),
            Err(e) => {
                warn!(error = %AuthError::invalid_response(e), "Session verification failed");
                SessionVerdict::Unauthenticated
            }
        }
    }
}
