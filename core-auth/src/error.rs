use bridge_traits::{BridgeError, HttpResponse};
use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthError {
    /// No token, or the backend rejected it (HTTP 401).
    #[error("Not authenticated")]
    Unauthenticated,

    /// Rejected input; the detail is meant for inline display.
    #[error("{detail}")]
    Validation { status: u16, detail: String },

    /// Any other non-success status.
    #[error("Request failed with status {status}: {detail}")]
    Http { status: u16, detail: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Session storage error: {0}")]
    Storage(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl AuthError {
    pub(crate) fn network(err: BridgeError) -> Self {
        AuthError::Network(err.to_string())
    }

    pub(crate) fn storage(err: BridgeError) -> Self {
        AuthError::Storage(err.to_string())
    }

    pub(crate) fn invalid_response(err: BridgeError) -> Self {
        AuthError::InvalidResponse(err.to_string())
    }

    /// Map a non-success response to an error, keeping the backend's detail.
    ///
    /// 400 and 422 are validation failures. 401 is handled by the gateway
    /// before this is reached, except on the public channel where it means
    /// bad credentials and is therefore a validation failure too.
    pub fn from_response(response: &HttpResponse) -> Self {
        let detail = error_detail(response);
        match response.status {
            400 | 401 | 422 => AuthError::Validation {
                status: response.status,
                detail,
            },
            status => AuthError::Http { status, detail },
        }
    }

    /// Whether the error should be shown next to the originating form.
    pub fn is_validation(&self) -> bool {
        matches!(self, AuthError::Validation { .. })
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    detail: ErrorDetail,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ErrorDetail {
    Message(String),
    Fields(Vec<FieldError>),
}

#[derive(Deserialize)]
struct FieldError {
    msg: String,
}

/// Human-readable error text from a backend response body.
///
/// Understands `{"detail": "..."}` and the field-list form
/// `{"detail": [{"msg": "..."}]}`; falls back to the status code.
pub fn error_detail(response: &HttpResponse) -> String {
    match serde_json::from_slice::<ErrorBody>(&response.body) {
        Ok(ErrorBody {
            detail: ErrorDetail::Message(message),
        }) => message,
        Ok(ErrorBody {
            detail: ErrorDetail::Fields(fields),
        }) if !fields.is_empty() => fields
            .into_iter()
            .map(|field| field.msg)
            .collect::<Vec<_>>()
            .join("; "),
        _ => format!("Request failed with status {}", response.status),
    }
}

pub type Result<T> = std::result::Result<T, AuthError>;
