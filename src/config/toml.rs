//! TOML configuration file parsing.
//!
//! Defines the structure of the configuration file with serde.

use std::path::Path;

use serde::Deserialize;

use super::ConfigError;

/// Root configuration structure from TOML file.
///
/// All fields are optional to allow partial configuration
/// that can be merged with CLI arguments.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TomlConfig {
    /// Controller connection section
    #[serde(default)]
    pub controller: ControllerSection,

    /// Monitoring configuration
    #[serde(default)]
    pub monitor: MonitorSection,

    /// Retry policy configuration
    #[serde(default)]
    pub retry: RetrySection,
}

/// Controller connection section.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ControllerSection {
    /// Controller base URL
    pub endpoint: Option<String>,

    /// User name for HTTP Basic authentication
    pub username: Option<String>,

    /// Password for HTTP Basic authentication
    pub password: Option<String>,
}

/// Monitoring configuration section.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MonitorSection {
    /// Polling interval in seconds
    pub poll_interval: Option<u64>,

    /// Seconds since the last OK report at which a sensor counts as clear
    pub ok_threshold: Option<u64>,
}

/// Retry policy configuration section.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RetrySection {
    /// Number of retries after the first failed attempt
    pub max_retries: Option<u32>,

    /// Backoff unit in milliseconds
    pub backoff_unit_ms: Option<u64>,
}

impl TomlConfig {
    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;

        Self::parse(&content)
    }

    /// Parses configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(ConfigError::from)
    }
}

/// Generates a default configuration file with comments.
#[must_use]
pub fn default_config_template() -> String {
    r#"# OHS Monitor Configuration File

[controller]
# Controller base URL (required); the status page is read from <endpoint>/z
# endpoint = "http://192.168.1.50"

# HTTP Basic credentials (username required, password defaults to empty)
# username = "admin"
# password = ""

[monitor]
# Polling interval in seconds (default: 10)
poll_interval = 10

# A sensor whose last OK report is younger than this many seconds is
# reported as alarming (default: 20)
# ok_threshold = 20

[retry]
# Retries after a failed request before the cycle is skipped (default: 3)
# max_retries = 3

# Backoff unit in milliseconds; the n-th retry waits n units (default: 2000)
# backoff_unit_ms = 2000
"#
    .to_string()
}
