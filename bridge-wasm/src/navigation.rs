//! Address bar access through `window.location` and the History API.

use bridge_traits::{
    error::{BridgeError, Result as BridgeResult},
    navigation::{Location, NavigateOptions, Navigator},
};
use tracing::debug;
use wasm_bindgen::JsValue;

use crate::error::{js_message, window};

/// Navigator over the live browser location.
///
/// Navigation uses `pushState` / `replaceState`; the host framework is
/// expected to re-render on its own `popstate` handling and then call
/// back into the router.
pub struct BrowserNavigator {
    window: web_sys::Window,
}

impl BrowserNavigator {
    /// Bind to the current window.
    pub fn new() -> BridgeResult<Self> {
        Ok(Self { window: window()? })
    }

    fn history(&self) -> BridgeResult<web_sys::History> {
        self.window
            .history()
            .map_err(|err| nav_error("history", err))
    }

    fn read(&self, part: &str, value: Result<String, JsValue>) -> String {
        value.unwrap_or_else(|err| {
            debug!(part, error = %js_message(&err), "Unreadable location part");
            String::new()
        })
    }
}

impl Navigator for BrowserNavigator {
    fn location(&self) -> Location {
        let location = self.window.location();
        let path = self.read("pathname", location.pathname());
        let search = self.read("search", location.search());
        let hash = self.read("hash", location.hash());

        Location::parse(&format!("{path}{search}{hash}"))
    }

    fn navigate(&self, path: &str, options: NavigateOptions) -> BridgeResult<()> {
        let history = self.history()?;
        let result = if options.replace {
            history.replace_state_with_url(&JsValue::NULL, "", Some(path))
        } else {
            history.push_state_with_url(&JsValue::NULL, "", Some(path))
        };
        result.map_err(|err| nav_error("navigate", err))?;

        debug!(to = path, replace = options.replace, "Navigated");
        Ok(())
    }

    /// Rewrites the current entry without its fragment and without adding
    /// a history entry.
    fn strip_fragment(&self) -> BridgeResult<()> {
        let stripped = self.location().without_fragment().to_string();
        self.history()?
            .replace_state_with_url(&JsValue::NULL, "", Some(&stripped))
            .map_err(|err| nav_error("strip fragment", err))
    }
}

fn nav_error(context: &str, err: JsValue) -> BridgeError {
    BridgeError::OperationFailed(format!("BrowserNavigator {context}: {}", js_message(&err)))
}
