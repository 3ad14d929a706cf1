//! Configuration model loaded by the config layer.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Main configuration structure for gitman
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// GitHub API configuration
    #[serde(default)]
    pub github: GitHubConfig,

    /// Local storage configuration
    #[serde(default)]
    pub storage: StorageConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Webhook receiver configuration
    #[serde(default)]
    pub webhook: WebhookConfig,
}

/// GitHub API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct GitHubConfig {
    /// REST API base URL
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// GraphQL endpoint
    #[serde(default = "default_graphql_url")]
    pub graphql_url: String,

    /// Personal access token (usually supplied via `GITHUB_TOKEN`)
    #[serde(default)]
    pub token: Option<String>,

    /// Repository to sync, `owner/repo` (usually supplied via `GITHUB_REPO`)
    #[serde(default)]
    pub repository: Option<String>,

    /// Client-side request budget per hour
    #[serde(default = "default_requests_per_hour")]
    pub requests_per_hour: u32,

    /// User-Agent header sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_api_base() -> String {
    "https://api.github.com".to_string()
}

fn default_graphql_url() -> String {
    "https://api.github.com/graphql".to_string()
}

const fn default_requests_per_hour() -> u32 {
    5_000
}

fn default_user_agent() -> String {
    concat!("gitman/", env!("CARGO_PKG_VERSION")).to_string()
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            graphql_url: default_graphql_url(),
            token: None,
            repository: None,
            requests_per_hour: default_requests_per_hour(),
            user_agent: default_user_agent(),
        }
    }
}

/// Local storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct StorageConfig {
    /// Store root holding issues/, discussions/, ... and sync_state.json
    #[serde(default = "default_storage_root")]
    pub root: PathBuf,
}

fn default_storage_root() -> PathBuf {
    PathBuf::from(".gitman")
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root: default_storage_root(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: json or pretty
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Directory for rolling log files; stderr only when unset
    #[serde(default)]
    pub log_dir: Option<PathBuf>,

    /// Rotation for file output: daily, hourly, never
    #[serde(default = "default_rotation")]
    pub rotation: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_rotation() -> String {
    "daily".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            log_dir: None,
            rotation: default_rotation(),
        }
    }
}

/// Webhook receiver configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct WebhookConfig {
    /// Address to bind
    #[serde(default = "default_webhook_host")]
    pub host: String,

    /// Port to listen on
    #[serde(default = "default_webhook_port")]
    pub port: u16,

    /// Directory of the raw `<event>_<action>.jsonl` archive
    #[serde(default = "default_webhook_log_dir")]
    pub log_dir: PathBuf,
}

fn default_webhook_host() -> String {
    "0.0.0.0".to_string()
}

const fn default_webhook_port() -> u16 {
    8000
}

fn default_webhook_log_dir() -> PathBuf {
    PathBuf::from(".gitman/logs")
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            host: default_webhook_host(),
            port: default_webhook_port(),
            log_dir: default_webhook_log_dir(),
        }
    }
}
