//! Configuration loading and credential resolution
//!
//! Bootstrap settings follow this priority order:
//! 1. Command-line argument (handled by the binary)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! A missing TOML file is never fatal. A malformed one is.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

/// Environment variable holding the vision provider base URL
pub const ENV_ENDPOINT: &str = "AZURE_ENDPOINT";

/// Environment variable holding the vision provider subscription key
pub const ENV_API_KEY: &str = "AZURE_API_KEY";

/// Default listen address
pub const DEFAULT_BIND: &str = "127.0.0.1:5730";

/// Default delay between read-operation status checks
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 1000;

/// Default number of status checks before giving up
pub const DEFAULT_MAX_POLL_ATTEMPTS: u32 = 30;

const CONFIG_DIR_NAME: &str = "vision-bridge";
const CONFIG_FILE_NAME: &str = "config.toml";

/// Bootstrap configuration loaded from TOML file
///
/// Every field is optional; absent values fall back to environment or
/// compiled defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    /// Listen address, e.g. "127.0.0.1:5730"
    #[serde(default)]
    pub bind: Option<String>,

    /// Vision provider credentials
    #[serde(default)]
    pub azure: AzureSection,

    /// OCR polling policy
    #[serde(default)]
    pub ocr: OcrSection,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// `[azure]` table
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AzureSection {
    pub endpoint: Option<String>,
    pub api_key: Option<String>,
}

/// `[ocr]` table
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OcrSection {
    pub poll_interval_ms: Option<u64>,
    pub max_poll_attempts: Option<u32>,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl TomlConfig {
    /// Parse a TOML config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Parse TOML {} failed: {}", path.display(), e)))
    }

    /// Locate and parse the config file, or fall back to defaults
    ///
    /// Returns the config together with where it came from.
    /// Does not log: this runs before the tracing subscriber exists.
    pub fn load_or_default(explicit: Option<&Path>) -> Result<(Self, ConfigSource)> {
        match (locate_config_file(explicit), explicit) {
            (Some(path), _) => Ok((Self::load(&path)?, ConfigSource::File(path))),
            (None, Some(missing)) => Ok((
                Self::default(),
                ConfigSource::ExplicitMissing(missing.to_path_buf()),
            )),
            (None, None) => Ok((Self::default(), ConfigSource::Defaults)),
        }
    }

    /// Listen address after applying the compiled default
    pub fn bind_addr(&self) -> &str {
        self.bind.as_deref().unwrap_or(DEFAULT_BIND)
    }
}

/// Where the bootstrap configuration was loaded from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Parsed from this file
    File(PathBuf),
    /// `--config` named a file that does not exist; defaults are used
    ExplicitMissing(PathBuf),
    /// No file in any standard location
    Defaults,
}

/// Find the config file to read
///
/// An explicit path (from the command line) is used only if it exists. Otherwise
/// the per-user config directory is tried, then `/etc` on Linux.
pub fn locate_config_file(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return path.exists().then(|| path.to_path_buf());
    }

    let user_config = dirs::config_dir().map(|d| d.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME));
    if let Some(path) = user_config {
        if path.exists() {
            return Some(path);
        }
    }

    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc")
            .join(CONFIG_DIR_NAME)
            .join(CONFIG_FILE_NAME);
        if system_config.exists() {
            return Some(system_config);
        }
    }

    None
}

/// Reject empty and whitespace-only values
pub fn is_valid_value(value: &str) -> bool {
    !value.trim().is_empty()
}

/// Vision provider endpoint and subscription key
///
/// The key is redacted from `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct AzureCredentials {
    endpoint: String,
    api_key: String,
}

impl std::fmt::Debug for AzureCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AzureCredentials")
            .field("endpoint", &self.endpoint)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

impl AzureCredentials {
    /// Build credentials, trimming whitespace and trailing slashes from the endpoint
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Result<Self> {
        let endpoint = endpoint.into();
        let api_key = api_key.into();

        let mut missing = Vec::new();
        if !is_valid_value(&endpoint) {
            missing.push(ENV_ENDPOINT);
        }
        if !is_valid_value(&api_key) {
            missing.push(ENV_API_KEY);
        }
        if !missing.is_empty() {
            return Err(Error::Config(format!(
                "Vision provider not configured: missing {}",
                missing.join(", ")
            )));
        }

        Ok(Self {
            endpoint: endpoint.trim().trim_end_matches('/').to_string(),
            api_key: api_key.trim().to_string(),
        })
    }

    /// Resolve credentials from the environment, then the `[azure]` table
    ///
    /// Each field is resolved independently.
    pub fn resolve(section: &AzureSection) -> Result<Self> {
        let endpoint = pick(std::env::var(ENV_ENDPOINT).ok(), section.endpoint.clone(), ENV_ENDPOINT);
        let api_key = pick(std::env::var(ENV_API_KEY).ok(), section.api_key.clone(), ENV_API_KEY);

        Self::new(endpoint.unwrap_or_default(), api_key.unwrap_or_default())
    }

    /// Base URL without trailing slash
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Subscription key sent as `Ocp-Apim-Subscription-Key`
    pub fn api_key(&self) -> &str {
        &self.api_key
    }
}

fn pick(env_value: Option<String>, toml_value: Option<String>, name: &str) -> Option<String> {
    if let Some(value) = env_value.filter(|v| is_valid_value(v)) {
        info!("{} loaded from environment variable", name);
        return Some(value);
    }
    if let Some(value) = toml_value.filter(|v| is_valid_value(v)) {
        info!("{} loaded from TOML config", name);
        return Some(value);
    }
    None
}

/// Fixed-delay, bounded-attempt polling policy for read operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Delay before each status check
    pub interval: Duration,
    /// Maximum number of status checks
    pub max_attempts: u32,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            max_attempts: DEFAULT_MAX_POLL_ATTEMPTS,
        }
    }
}

impl PollPolicy {
    /// Build a policy, rejecting a zero attempt budget
    pub fn new(interval: Duration, max_attempts: u32) -> Result<Self> {
        if max_attempts == 0 {
            return Err(Error::Config(
                "max_poll_attempts must be at least 1".to_string(),
            ));
        }
        Ok(Self {
            interval,
            max_attempts,
        })
    }

    /// Apply `[ocr]` overrides on top of the defaults
    pub fn from_section(section: &OcrSection) -> Result<Self> {
        let defaults = Self::default();
        Self::new(
            section
                .poll_interval_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.interval),
            section.max_poll_attempts.unwrap_or(defaults.max_attempts),
        )
    }

    /// Upper bound on time spent polling
    pub fn worst_case(&self) -> Duration {
        self.interval * self.max_attempts
    }
}
