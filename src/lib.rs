//! Price audit backend
//!
//! Scores "inflate the list price, then discount back to normal" pricing and
//! serves the audit over a small JSON API.

pub mod api;
pub mod audit;
pub mod config_manager;
pub mod error;
pub mod interest;
pub mod presets;
pub mod stats;
pub mod types;

use crate::config_manager::{AuditDefaults, ConfigManager, ServerConfig};
use std::time::Instant;

pub use crate::audit::{audit_price, PriceAuditEngine};
pub use crate::types::{PriceAuditInput, PriceAuditOutput};

/// Application state shared across all handlers
pub struct AppState {
    pub config: ConfigManager,
    pub server: ServerConfig,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(server: ServerConfig, defaults: AuditDefaults) -> Self {
        Self {
            config: ConfigManager::new(defaults),
            server,
            started_at: Instant::now(),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(ServerConfig::default(), AuditDefaults::default())
    }
}
