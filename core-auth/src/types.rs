use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque bearer credential issued by the advising backend.
///
/// Holding a token is necessary but not sufficient for being authenticated:
/// only the backend can say whether it is still valid. The `Debug`
/// representation never reveals the value.
///
/// # Examples
///
/// ```
/// use core_auth::SessionToken;
///
/// let token = SessionToken::new("session_4f1c");
/// assert_eq!(token.as_str(), "session_4f1c");
/// assert_eq!(format!("{:?}", token), "SessionToken([REDACTED])");
/// ```
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionToken(String);

impl SessionToken {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// The raw credential, for the `Authorization` header only.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionToken([REDACTED])")
    }
}

/// The signed-in student as reported by the backend.
///
/// The locally cached copy is advisory. Guards always ask the backend again
/// before rendering protected content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    #[serde(alias = "id")]
    pub user_id: String,
    pub email: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub picture: Option<String>,
    #[serde(default)]
    pub is_admin: bool,
    /// Whether the onboarding questionnaire has been submitted
    #[serde(default)]
    pub profile_complete: bool,
}

/// Success body shared by login, signup and the OAuth exchange.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    pub session_token: SessionToken,
    #[serde(flatten)]
    pub user: UserRecord,
}

/// Token and cached user held together by the session store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub token: SessionToken,
    /// `None` when the cached user slot was missing or unreadable
    pub user: Option<UserRecord>,
}

/// Login form body.
#[derive(Serialize)]
pub(crate) struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// Signup form body.
#[derive(Serialize)]
pub(crate) struct SignupRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
    pub name: &'a str,
}

/// OAuth exchange body.
#[derive(Serialize)]
pub(crate) struct ExchangeRequest<'a> {
    pub session_id: &'a str,
}
