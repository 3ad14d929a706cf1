//! Tracing subscriber setup for console and rolling file output.

use std::io;

use anyhow::{Context, Result};
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

use crate::domain::models::config::LoggingConfig;

const LOG_FILE_PREFIX: &str = "gitman.log";

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Logger implementation using tracing
///
/// Console output goes to stderr so that command output on stdout (notably
/// `--json`) stays machine-readable.
pub struct LoggerImpl {
    _guard: Option<WorkerGuard>,
}

impl LoggerImpl {
    /// Install the global subscriber.
    ///
    /// `RUST_LOG` takes precedence over the configured level. When
    /// `log_dir` is set, a JSON file layer with the configured rotation is
    /// added; the returned value must be kept alive to flush it.
    ///
    /// # Errors
    /// Returns an error for an invalid level or rotation, or when a global
    /// subscriber is already installed.
    pub fn init(config: &LoggingConfig) -> Result<Self> {
        let default_level = parse_log_level(&config.level)?;
        let filter = || {
            EnvFilter::builder()
                .with_default_directive(default_level.into())
                .from_env_lossy()
        };

        let console: BoxedLayer = match config.format.as_str() {
            "json" => tracing_subscriber::fmt::layer()
                .json()
                .with_writer(io::stderr)
                .with_current_span(true)
                .with_target(true)
                .with_filter(filter())
                .boxed(),
            _ => tracing_subscriber::fmt::layer()
                .with_writer(io::stderr)
                .with_target(false)
                .with_filter(filter())
                .boxed(),
        };
        let mut layers = vec![console];

        let guard = if let Some(log_dir) = &config.log_dir {
            let appender = match config.rotation.as_str() {
                "daily" => rolling::daily(log_dir, LOG_FILE_PREFIX),
                "hourly" => rolling::hourly(log_dir, LOG_FILE_PREFIX),
                "never" => rolling::never(log_dir, LOG_FILE_PREFIX),
                other => anyhow::bail!("Invalid log rotation: {other}"),
            };
            let (writer, guard) = tracing_appender::non_blocking(appender);

            // File output is always JSON.
            layers.push(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(writer)
                    .with_ansi(false)
                    .with_current_span(true)
                    .with_target(true)
                    .with_file(true)
                    .with_line_number(true)
                    .with_filter(filter())
                    .boxed(),
            );
            Some(guard)
        } else {
            None
        };

        tracing_subscriber::registry()
            .with(layers)
            .try_init()
            .context("Failed to install tracing subscriber")?;

        tracing::debug!(
            level = %config.level,
            format = %config.format,
            file_output = config.log_dir.is_some(),
            "logger initialized"
        );

        Ok(Self { _guard: guard })
    }
}

/// Parse log level string to Level
fn parse_log_level(level: &str) -> Result<Level> {
    match level.to_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        _ => anyhow::bail!("Invalid log level: {level}"),
    }
}
