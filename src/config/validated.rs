//! Validated configuration after merging CLI and TOML sources.
//!
//! This module contains the final, validated configuration that is used
//! by the application. All validation is performed during construction.

use std::fmt;
use std::path::Path;
use std::time::Duration;

use url::Url;

use crate::controller::{BasicAuth, RetryPolicy};

use super::cli::Cli;
use super::defaults;
use super::error::{ConfigError, field};
use super::toml::TomlConfig;

/// Fully validated configuration ready for use by the application.
///
/// This struct represents a complete, validated configuration where all
/// required fields are present and all values have been validated.
///
/// # Construction
///
/// Use [`ValidatedConfig::from_raw`] to create from CLI args and optional TOML config.
/// The function validates all inputs and returns errors for invalid configurations.
#[derive(Debug)]
pub struct ValidatedConfig {
    /// Controller base URL (required)
    pub endpoint: Url,

    /// HTTP Basic credentials (user name required)
    pub auth: BasicAuth,

    /// Polling interval
    pub poll_interval: Duration,

    /// OK threshold in seconds
    pub ok_threshold_secs: u64,

    /// Retry policy for failed status page requests
    pub retry_policy: RetryPolicy,

    /// Verbose logging enabled
    pub verbose: bool,
}

impl fmt::Display for ValidatedConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let password = if self.auth.password.is_empty() {
            "none"
        } else {
            "***"
        };

        write!(
            f,
            "Config {{ endpoint: {}, username: {}, password: {}, poll_interval: {}s, \
             ok_threshold: {}s, retry: {}x/{}ms }}",
            self.endpoint,
            self.auth.username,
            password,
            self.poll_interval.as_secs(),
            self.ok_threshold_secs,
            self.retry_policy.max_retries,
            self.retry_policy.backoff_unit.as_millis(),
        )
    }
}

impl ValidatedConfig {
    /// Creates a validated configuration from CLI arguments and optional TOML config.
    ///
    /// CLI arguments take precedence over TOML config values.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Required fields are missing (`endpoint`, `username`)
    /// - The endpoint is not an absolute `http`/`https` URL
    /// - The poll interval or backoff unit is zero
    pub fn from_raw(cli: &Cli, toml: Option<&TomlConfig>) -> Result<Self, ConfigError> {
        let endpoint = Self::resolve_endpoint(cli, toml)?;
        let auth = Self::resolve_auth(cli, toml)?;
        let poll_interval = Self::resolve_poll_interval(cli, toml)?;

        let ok_threshold_secs = toml
            .and_then(|t| t.monitor.ok_threshold)
            .unwrap_or(defaults::OK_THRESHOLD_SECS);

        let retry_policy = Self::build_retry_policy(cli, toml)?;

        Ok(Self {
            endpoint,
            auth,
            poll_interval,
            ok_threshold_secs,
            retry_policy,
            verbose: cli.verbose,
        })
    }

    /// Loads and merges configuration from CLI and optional config file.
    ///
    /// If `cli.config` is set, loads the TOML file from that path.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The config file cannot be read or parsed
    /// - The merged configuration is invalid
    pub fn load(cli: &Cli) -> Result<Self, ConfigError> {
        let toml = if let Some(ref path) = cli.config {
            Some(TomlConfig::load(path)?)
        } else {
            None
        };

        Self::from_raw(cli, toml.as_ref())
    }

    fn resolve_endpoint(cli: &Cli, toml: Option<&TomlConfig>) -> Result<Url, ConfigError> {
        // CLI takes precedence
        let url_str = cli
            .endpoint
            .as_deref()
            .or_else(|| toml.and_then(|t| t.controller.endpoint.as_deref()))
            .ok_or_else(|| {
                ConfigError::missing(
                    field::ENDPOINT,
                    "Use --endpoint or set controller.endpoint in config file",
                )
            })?;

        let url = Url::parse(url_str).map_err(|e| ConfigError::InvalidUrl {
            url: url_str.to_string(),
            reason: e.to_string(),
        })?;

        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(ConfigError::InvalidUrl {
                url: url_str.to_string(),
                reason: format!("unsupported scheme '{other}', expected http or https"),
            }),
        }
    }

    fn resolve_auth(cli: &Cli, toml: Option<&TomlConfig>) -> Result<BasicAuth, ConfigError> {
        let controller = toml.map(|t| &t.controller);

        let username = cli
            .username
            .as_deref()
            .or_else(|| controller.and_then(|c| c.username.as_deref()))
            .ok_or_else(|| {
                ConfigError::missing(
                    field::USERNAME,
                    "Use --username or set controller.username in config file",
                )
            })?;

        let password = cli
            .password
            .as_deref()
            .or_else(|| controller.and_then(|c| c.password.as_deref()))
            .unwrap_or(defaults::PASSWORD);

        Ok(BasicAuth::new(username, password))
    }

    fn resolve_poll_interval(
        cli: &Cli,
        toml: Option<&TomlConfig>,
    ) -> Result<Duration, ConfigError> {
        // Priority: CLI explicit > TOML > default
        let seconds = cli
            .poll_interval
            .or_else(|| toml.and_then(|t| t.monitor.poll_interval))
            .unwrap_or(defaults::POLL_INTERVAL_SECS);

        if seconds == 0 {
            return Err(ConfigError::InvalidDuration {
                field: "poll_interval",
                reason: "must be greater than 0".to_string(),
            });
        }

        Ok(Duration::from_secs(seconds))
    }

    fn build_retry_policy(
        cli: &Cli,
        toml: Option<&TomlConfig>,
    ) -> Result<RetryPolicy, ConfigError> {
        let retry = toml.map(|t| &t.retry);

        // Priority: CLI explicit > TOML > default
        let max_retries = cli
            .retry_max
            .or_else(|| retry.and_then(|r| r.max_retries))
            .unwrap_or(defaults::RETRY_MAX_RETRIES);

        let backoff_unit_ms = cli
            .retry_delay
            .or_else(|| retry.and_then(|r| r.backoff_unit_ms))
            .unwrap_or(defaults::RETRY_BACKOFF_UNIT_MS);

        if backoff_unit_ms == 0 {
            return Err(ConfigError::InvalidDuration {
                field: "backoff_unit_ms",
                reason: "must be greater than 0".to_string(),
            });
        }

        Ok(RetryPolicy::new()
            .with_max_retries(max_retries)
            .with_backoff_unit(Duration::from_millis(backoff_unit_ms)))
    }
}

/// Writes the default configuration template to a file.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn write_default_config(path: &Path) -> Result<(), ConfigError> {
    let template = super::toml::default_config_template();
    std::fs::write(path, template).map_err(|e| ConfigError::FileWrite {
        path: path.to_path_buf(),
        source: e,
    })
}
