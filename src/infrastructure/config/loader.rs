//! Layered config loading with figment: defaults, YAML files, then `GITMAN_` env vars.

use std::path::Path;

use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use thiserror::Error;

use crate::domain::models::config::Config;
use crate::domain::models::RepoRef;

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Repository is not `owner/repo`.
    #[error("Invalid repository: {0}. Expected owner/repo")]
    InvalidRepository(String),

    /// Zero request quota.
    #[error("Invalid requests_per_hour: {0}. Must be positive")]
    InvalidRequestsPerHour(u32),

    /// Unknown tracing level.
    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    /// Unknown log format.
    #[error("Invalid log format: {0}. Must be one of: json, pretty")]
    InvalidLogFormat(String),

    /// Unknown rotation policy.
    #[error("Invalid log rotation: {0}. Must be one of: daily, hourly, never")]
    InvalidRotation(String),

    /// Empty storage root path.
    #[error("Storage root cannot be empty")]
    EmptyStorageRoot,

    /// Port 0 for the receiver.
    #[error("Webhook port cannot be 0")]
    InvalidPort,
}

/// Directory holding `config.yaml` and `local.yaml` by default.
pub const DEFAULT_CONFIG_DIR: &str = ".gitman";

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from `.gitman/` in the working directory.
    pub fn load() -> Result<Config> {
        Self::load_from_dir(DEFAULT_CONFIG_DIR)
    }

    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. `<dir>/config.yaml`
    /// 3. `<dir>/local.yaml` (optional local overrides)
    /// 4. Environment variables (`GITMAN_*`, `__` for nesting)
    /// 5. `GITHUB_TOKEN` and `GITHUB_REPO`
    pub fn load_from_dir(dir: impl AsRef<Path>) -> Result<Config> {
        let dir = dir.as_ref();
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(dir.join("config.yaml")))
            .merge(Yaml::file(dir.join("local.yaml")))
            .merge(Env::prefixed("GITMAN_").split("__"))
            .merge(Env::raw().only(&["GITHUB_TOKEN"]).map(|_| "github.token".into()))
            .merge(Env::raw().only(&["GITHUB_REPO"]).map(|_| "github.repository".into()))
            .extract()
            .with_context(|| format!("Failed to load configuration from {}", dir.display()))?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific file, without environment overrides
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path.as_ref()))
            .extract()
            .with_context(|| format!("Failed to load config from {}", path.as_ref().display()))?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate configuration after loading
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        if let Some(repo) = &config.github.repository {
            repo.parse::<RepoRef>()
                .map_err(|_| ConfigError::InvalidRepository(repo.clone()))?;
        }

        if config.github.requests_per_hour == 0 {
            return Err(ConfigError::InvalidRequestsPerHour(0));
        }

        if config.storage.root.as_os_str().is_empty() {
            return Err(ConfigError::EmptyStorageRoot);
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        let valid_log_formats = ["json", "pretty"];
        if !valid_log_formats.contains(&config.logging.format.as_str()) {
            return Err(ConfigError::InvalidLogFormat(config.logging.format.clone()));
        }

        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&config.logging.rotation.as_str()) {
            return Err(ConfigError::InvalidRotation(config.logging.rotation.clone()));
        }

        if config.webhook.port == 0 {
            return Err(ConfigError::InvalidPort);
        }

        Ok(())
    }
}
