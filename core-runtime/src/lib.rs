//! # Core Runtime Module
//!
//! Foundational runtime infrastructure for the ACE client core:
//! - Logging and tracing bootstrap ([`logging`])
//! - Client configuration with fail-fast validation ([`config`])
//! - Event bus for session and route notifications ([`events`])

pub mod config;
pub mod error;
pub mod events;
pub mod logging;

pub use config::{ClientConfig, ClientConfigBuilder, RoutePaths};
pub use error::{Error, Result};
pub use events::{AuthEvent, CoreEvent, EventBus, RouteEvent};
