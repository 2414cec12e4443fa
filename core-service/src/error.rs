use core_auth::AuthError;
use thiserror::Error;

/// Errors returned by the advising API clients.
#[derive(Error, Debug)]
pub enum ApiError {
    /// The session is missing or was rejected; the user is already on the
    /// way to the login page.
    #[error("Not authenticated")]
    Unauthenticated,

    #[error("Not found: {0}")]
    NotFound(String),

    /// Input rejected locally or by the backend; meant for inline display.
    #[error("{0}")]
    Validation(String),

    #[error("Request failed with status {status}: {detail}")]
    Request { status: u16, detail: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl ApiError {
    pub fn is_validation(&self) -> bool {
        matches!(self, ApiError::Validation(_))
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Unauthenticated => ApiError::Unauthenticated,
            AuthError::Validation { detail, .. } => ApiError::Validation(detail),
            AuthError::Http {
                status: 404,
                detail,
            } => ApiError::NotFound(detail),
            AuthError::Http { status, detail } => ApiError::Request { status, detail },
            AuthError::Network(message) => ApiError::Network(message),
            AuthError::Storage(message) => ApiError::Storage(message),
            AuthError::InvalidResponse(message) => ApiError::InvalidResponse(message),
        }
    }
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Core initialization failed: {0}")]
    InitializationFailed(String),

    #[error("Configuration error: {0}")]
    Config(#[from] core_runtime::Error),

    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),

    #[error("API error: {0}")]
    Api(#[from] ApiError),
}

pub type Result<T> = std::result::Result<T, ServiceError>;
