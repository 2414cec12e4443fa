//! Error helpers for the browser bridges

use bridge_traits::error::BridgeError;
use thiserror::Error;
use wasm_bindgen::{JsCast, JsValue};

/// Result type for browser bridge operations
pub type WasmResult<T> = Result<T, WasmError>;

/// Errors raised while talking to browser APIs
#[derive(Error, Debug)]
pub enum WasmError {
    /// A browser global (`window`, `localStorage`, `history`) is missing
    #[error("Browser API unavailable: {0}")]
    Unavailable(String),

    /// JavaScript exception surfaced through web-sys
    #[error("JavaScript error in {context}: {message}")]
    JavaScript {
        /// Operation that failed
        context: String,
        /// Exception message
        message: String,
    },
}

impl WasmError {
    /// Wrap a thrown `JsValue` with the operation that raised it.
    pub fn js(context: &str, err: JsValue) -> Self {
        WasmError::JavaScript {
            context: context.to_string(),
            message: js_message(&err),
        }
    }
}

impl From<WasmError> for BridgeError {
    fn from(err: WasmError) -> Self {
        match err {
            WasmError::Unavailable(what) => BridgeError::NotAvailable(what),
            other => BridgeError::OperationFailed(other.to_string()),
        }
    }
}

/// Best-effort human readable message for a thrown `JsValue`.
pub(crate) fn js_message(err: &JsValue) -> String {
    if let Some(message) = err.as_string() {
        message
    } else if let Some(error) = err.dyn_ref::<js_sys::Error>() {
        error.message().into()
    } else {
        format!("{err:?}")
    }
}

pub(crate) fn window() -> WasmResult<web_sys::Window> {
    web_sys::window().ok_or_else(|| WasmError::Unavailable("window".to_string()))
}
