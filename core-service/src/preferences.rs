//! Cosmetic UI state that survives reloads.
//!
//! Stored in the same [`SettingsStore`] as the session but under its own
//! keys, so signing out leaves these untouched.

use crate::error::{ApiError, ApiResult};
use bridge_traits::SettingsStore;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::warn;

pub const SIDEBAR_COLLAPSED_KEY: &str = "ace_sidebar_collapsed";
pub const QUICK_TOOLS_KEY: &str = "ace_quick_tools";

/// Prompts offered on an empty conversation.
pub const DEFAULT_QUICK_TOOLS: [&str; 4] = [
    "Help me plan this semester",
    "What should I focus on this week?",
    "I'm worried about a deadline",
    "Check my schedule",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UiPreferences {
    pub sidebar_collapsed: bool,
    pub quick_tools: Vec<String>,
}

impl Default for UiPreferences {
    fn default() -> Self {
        Self {
            sidebar_collapsed: false,
            quick_tools: DEFAULT_QUICK_TOOLS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

#[derive(Clone)]
pub struct PreferencesStore {
    settings: Arc<dyn SettingsStore>,
}

impl PreferencesStore {
    pub fn new(settings: Arc<dyn SettingsStore>) -> Self {
        Self { settings }
    }

    /// Load preferences, falling back to defaults for anything missing or
    /// unreadable.
    pub async fn load(&self) -> UiPreferences {
        let defaults = UiPreferences::default();

        let sidebar_collapsed = match self.settings.get_bool(SIDEBAR_COLLAPSED_KEY).await {
            Ok(value) => value.unwrap_or(defaults.sidebar_collapsed),
            Err(e) => {
                warn!(error = %e, "Unreadable sidebar preference");
                defaults.sidebar_collapsed
            }
        };

        let quick_tools = match self.settings.get_string(QUICK_TOOLS_KEY).await {
            Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                warn!(error = %e, "Unreadable quick tools preference");
                defaults.quick_tools.clone()
            }),
            Ok(None) => defaults.quick_tools.clone(),
            Err(e) => {
                warn!(error = %e, "Failed to read quick tools preference");
                defaults.quick_tools.clone()
            }
        };

        UiPreferences {
            sidebar_collapsed,
            quick_tools,
        }
    }

    pub async fn save(&self, preferences: &UiPreferences) -> ApiResult<()> {
        self.set_sidebar_collapsed(preferences.sidebar_collapsed)
            .await?;
        self.set_quick_tools(&preferences.quick_tools).await
    }

    pub async fn set_sidebar_collapsed(&self, collapsed: bool) -> ApiResult<()> {
        self.settings
            .set_bool(SIDEBAR_COLLAPSED_KEY, collapsed)
            .await
            .map_err(|e| ApiError::Storage(e.to_string()))
    }

    pub async fn set_quick_tools(&self, tools: &[String]) -> ApiResult<()> {
        let json = serde_json::to_string(tools)
            .map_err(|e| ApiError::Storage(format!("Failed to serialize quick tools: {}", e)))?;
        self.settings
            .set_string(QUICK_TOOLS_KEY, &json)
            .await
            .map_err(|e| ApiError::Storage(e.to_string()))
    }
}

impl std::fmt::Debug for PreferencesStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreferencesStore").finish_non_exhaustive()
    }
}
