//! JavaScript bindings for browser hosts.
//!
//! The SPA shell keeps rendering in JavaScript and asks this module what to
//! render after every navigation.
//!
//! ```javascript
//! const client = await AceClient.init("https://ace.example.edu");
//! window.addEventListener("popstate", () => client.dispatch().then(render));
//! render(await client.dispatch());
//! ```

use crate::bootstrap::{bootstrap_wasm, WasmBridgeConfig};
use crate::client::AdvisorClient;
use core_auth::{CallbackOutcome, DispatchOutcome, GuardState, MountOutcome};
use serde::Serialize;
use wasm_bindgen::prelude::*;

fn to_js_error<E: std::fmt::Display>(err: E) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value).map_err(to_js_error)
}

/// What the shell should show after a dispatch.
#[derive(Serialize)]
#[serde(tag = "view", rename_all = "camelCase")]
enum View {
    /// Spinner; the guard has not decided yet or was superseded.
    Loading,
    /// Render the page registered for `path`.
    Page { path: String },
    /// The core already navigated; dispatch again for the new location.
    Navigated { to: Option<String> },
}

impl From<DispatchOutcome> for View {
    fn from(outcome: DispatchOutcome) -> Self {
        match outcome {
            DispatchOutcome::Guard {
                path,
                outcome: MountOutcome::Applied(state),
            } if state.renders_children() => View::Page { path },
            DispatchOutcome::Guard {
                outcome: MountOutcome::Applied(GuardState::Loading),
                ..
            }
            | DispatchOutcome::Guard {
                outcome: MountOutcome::Superseded,
                ..
            } => View::Loading,
            DispatchOutcome::Guard { .. } => View::Navigated { to: None },
            DispatchOutcome::Callback(CallbackOutcome::AlreadyConsumed) => View::Loading,
            DispatchOutcome::Callback(
                CallbackOutcome::Completed { destination }
                | CallbackOutcome::Failed { destination }
                | CallbackOutcome::Reused { destination },
            ) => View::Navigated {
                to: Some(destination),
            },
            DispatchOutcome::Callback(CallbackOutcome::MissingIdentifier) => View::Navigated { to: None },
            DispatchOutcome::Redirected { to } => View::Navigated { to: Some(to) },
        }
    }
}

/// Browser-facing handle to the advising client.
#[wasm_bindgen]
pub struct AceClient {
    inner: AdvisorClient,
}

#[wasm_bindgen]
impl AceClient {
    /// Build the browser bridges and restore any saved session.
    pub async fn init(api_base_url: String) -> Result<AceClient, JsValue> {
        let inner = bootstrap_wasm(&api_base_url, WasmBridgeConfig::default())
            .await
            .map_err(to_js_error)?;
        Ok(Self { inner })
    }

    /// Route the current location; resolves to `{view, path?, to?}`.
    pub async fn dispatch(&self) -> Result<JsValue, JsValue> {
        let view = View::from(self.inner.router().dispatch().await);
        to_js(&view)
    }

    /// Resolves to the signed-in user, or rejects with the inline error text.
    pub async fn login(&self, email: String, password: String) -> Result<JsValue, JsValue> {
        let outcome = self
            .inner
            .auth()
            .login(&email, &password)
            .await
            .map_err(to_js_error)?;
        to_js(&outcome.user)
    }

    pub async fn signup(
        &self,
        email: String,
        password: String,
        name: String,
    ) -> Result<JsValue, JsValue> {
        let outcome = self
            .inner
            .auth()
            .signup(&email, &password, &name)
            .await
            .map_err(to_js_error)?;
        to_js(&outcome.user)
    }

    pub async fn logout(&self) {
        self.inner.auth().logout().await;
    }

    /// The cached user record, or `undefined`.
    #[wasm_bindgen(js_name = currentUser)]
    pub fn current_user(&self) -> Result<JsValue, JsValue> {
        match self.inner.auth().current_user() {
            Some(user) => to_js(&user),
            None => Ok(JsValue::UNDEFINED),
        }
    }
}
