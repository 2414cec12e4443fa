//! In-process history for desktop shells.

use bridge_traits::{
    error::Result,
    navigation::{Location, NavigateOptions, Navigator},
};
use std::sync::{Mutex, MutexGuard};
use tracing::debug;

/// A history stack standing in for the browser address bar.
///
/// Desktop webviews report their route changes to the core through
/// [`HistoryNavigator::navigate`] and read them back with
/// [`HistoryNavigator::entries`].
pub struct HistoryNavigator {
    entries: Mutex<Vec<Location>>,
}

impl HistoryNavigator {
    pub fn new(initial: &str) -> Self {
        Self {
            entries: Mutex::new(vec![Location::parse(initial)]),
        }
    }

    fn entries_mut(&self) -> MutexGuard<'_, Vec<Location>> {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// All history entries, oldest first.
    pub fn entries(&self) -> Vec<Location> {
        self.entries_mut().clone()
    }

    /// Pop the current entry, like the browser back button.
    ///
    /// Returns `false` at the first entry.
    pub fn back(&self) -> bool {
        let mut entries = self.entries_mut();
        if entries.len() > 1 {
            entries.pop();
            true
        } else {
            false
        }
    }
}

impl Navigator for HistoryNavigator {
    fn location(&self) -> Location {
        self.entries_mut()
            .last()
            .cloned()
            .unwrap_or_else(|| Location::new("/"))
    }

    fn navigate(&self, path: &str, options: NavigateOptions) -> Result<()> {
        let next = Location::parse(path);
        let mut entries = self.entries_mut();
        if options.replace {
            entries.pop();
        }
        debug!(to = %next, replace = options.replace, "Navigating");
        entries.push(next);
        Ok(())
    }

    fn strip_fragment(&self) -> Result<()> {
        let mut entries = self.entries_mut();
        if let Some(current) = entries.last_mut() {
            *current = current.without_fragment();
        }
        Ok(())
    }
}
