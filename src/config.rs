//! Configuration System
//!
//! Layered configuration for the generation client: defaults, the global config file,
//! workspace config files, then `FLEXGEN__SECTION__KEY` environment variables.
//! Validation reports every problem at once.

use crate::lifecycle::StaleResponsePolicy;
use crate::logging::LoggingConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

mod facade;
mod merge;
mod sources;

pub use facade::ConfigLoader;

/// Address of the generation service when nothing is configured
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FlexgenConfig {
    /// Generation service connection
    #[serde(default)]
    pub server: ServerConfig,

    /// Where downloaded files are written
    #[serde(default)]
    pub output: OutputConfig,

    /// Submission lifecycle behaviour
    #[serde(default)]
    pub lifecycle: LifecycleConfig,

    /// Copy-to-clipboard behaviour
    #[serde(default)]
    pub clipboard: ClipboardConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    /// Generation is slow on the server side; keep this generous
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_request_timeout_secs() -> u64 {
    600
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            connect_timeout_secs: default_connect_timeout_secs(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Download directory (default: the user's download directory, else `.`)
    #[serde(default)]
    pub directory: Option<PathBuf>,
}

impl OutputConfig {
    pub fn resolve_directory(&self) -> PathBuf {
        if let Some(dir) = &self.directory {
            return dir.clone();
        }
        directories::UserDirs::new()
            .and_then(|dirs| dirs.download_dir().map(|d| d.to_path_buf()))
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LifecycleConfig {
    #[serde(default)]
    pub stale_responses: StaleResponsePolicy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClipboardConfig {
    /// How long the "copied" indicator stays on
    #[serde(default = "default_copied_indicator_ms")]
    pub copied_indicator_ms: u64,

    /// Copy command used by the fallback path instead of the platform default
    #[serde(default)]
    pub fallback_command: Option<Vec<String>>,
}

fn default_copied_indicator_ms() -> u64 {
    2000
}

impl ClipboardConfig {
    pub fn copied_indicator(&self) -> Duration {
        Duration::from_millis(self.copied_indicator_ms)
    }
}

impl Default for ClipboardConfig {
    fn default() -> Self {
        Self {
            copied_indicator_ms: default_copied_indicator_ms(),
            fallback_command: None,
        }
    }
}

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigValidationError {
    Server(String),
    Output(String),
    Clipboard(String),
    Logging(String),
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigValidationError::Server(msg) => write!(f, "Server: {}", msg),
            ConfigValidationError::Output(msg) => write!(f, "Output: {}", msg),
            ConfigValidationError::Clipboard(msg) => write!(f, "Clipboard: {}", msg),
            ConfigValidationError::Logging(msg) => write!(f, "Logging: {}", msg),
        }
    }
}

impl std::error::Error for ConfigValidationError {}

impl ServerConfig {
    pub fn validate(&self) -> Result<(), String> {
        let url = reqwest::Url::parse(&self.base_url)
            .map_err(|e| format!("Invalid base_url '{}': {}", self.base_url, e))?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(format!(
                "base_url must use http or https, got '{}'",
                url.scheme()
            ));
        }
        if self.connect_timeout_secs == 0 || self.request_timeout_secs == 0 {
            return Err("Timeouts must be greater than zero".to_string());
        }
        Ok(())
    }
}

impl FlexgenConfig {
    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), Vec<ConfigValidationError>> {
        let mut errors = Vec::new();

        if let Err(e) = self.server.validate() {
            errors.push(ConfigValidationError::Server(e));
        }

        if let Some(dir) = &self.output.directory {
            if dir.as_os_str().is_empty() {
                errors.push(ConfigValidationError::Output(
                    "directory cannot be empty".to_string(),
                ));
            } else if dir.is_file() {
                errors.push(ConfigValidationError::Output(format!(
                    "{} is a file, not a directory",
                    dir.display()
                )));
            }
        }

        if let Some(command) = &self.clipboard.fallback_command {
            if command.first().map_or(true, |program| program.trim().is_empty()) {
                errors.push(ConfigValidationError::Clipboard(
                    "fallback_command must start with a program name".to_string(),
                ));
            }
        }

        if let Err(e) = self.logging.validate() {
            errors.push(ConfigValidationError::Logging(e));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
