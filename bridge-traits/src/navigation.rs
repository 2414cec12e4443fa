//! Navigation Abstraction
//!
//! Exposes the host's address bar and history stack. In the browser this is
//! `window.location` plus the History API; on desktop it is an in-process
//! history stack.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::Result;
use crate::platform::PlatformSendSync;

/// A parsed client-side location: `path?query#fragment`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub path: String,
    pub query: Option<String>,
    pub fragment: Option<String>,
}

impl Location {
    /// Parse a path-relative location such as `/assistant?tab=1#session_id=abc`.
    ///
    /// An empty path normalizes to `/`. A bare `#` yields `Some("")` so the
    /// caller can still tell that a fragment marker was present.
    pub fn parse(raw: &str) -> Self {
        let (before_fragment, fragment) = match raw.split_once('#') {
            Some((head, frag)) => (head, Some(frag.to_string())),
            None => (raw, None),
        };
        let (path, query) = match before_fragment.split_once('?') {
            Some((path, query)) => (path, Some(query.to_string())),
            None => (before_fragment, None),
        };
        let path = if path.is_empty() { "/" } else { path };

        Self {
            path: path.to_string(),
            query,
            fragment,
        }
    }

    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            query: None,
            fragment: None,
        }
    }

    /// The same location with the fragment removed.
    pub fn without_fragment(&self) -> Self {
        Self {
            fragment: None,
            ..self.clone()
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path)?;
        if let Some(query) = &self.query {
            write!(f, "?{}", query)?;
        }
        if let Some(fragment) = &self.fragment {
            write!(f, "#{}", fragment)?;
        }
        Ok(())
    }
}

/// Options for a navigation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NavigateOptions {
    /// Replace the current history entry instead of pushing a new one.
    pub replace: bool,
}

impl NavigateOptions {
    pub fn replace() -> Self {
        Self { replace: true }
    }

    pub fn push() -> Self {
        Self { replace: false }
    }
}

/// Host navigation trait
///
/// All methods are synchronous: reading and rewriting the address bar never
/// suspends, which lets the router inspect the location at render time.
pub trait Navigator: PlatformSendSync {
    /// The location currently shown in the address bar.
    fn location(&self) -> Location;

    /// Navigate to `path`.
    fn navigate(&self, path: &str, options: NavigateOptions) -> Result<()>;

    /// Rewrite the current history entry without its fragment.
    ///
    /// Must not trigger a navigation; only the visible address changes.
    fn strip_fragment(&self) -> Result<()>;
}
