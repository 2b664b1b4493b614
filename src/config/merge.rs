//! Merge rules: defaults and override order.
//!
//! Later sources win: defaults < global file < workspace files < environment.

use super::DEFAULT_BASE_URL;
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError};

/// Create a Config builder with merge policy defaults applied.
pub fn builder_with_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Config::builder()
        .set_default("server.base_url", DEFAULT_BASE_URL)?
        .set_default("server.connect_timeout_secs", 10)?
        .set_default("server.request_timeout_secs", 600)?
        .set_default("lifecycle.stale_responses", "apply")?
        .set_default("clipboard.copied_indicator_ms", 2000)
}
