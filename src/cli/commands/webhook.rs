//! Implementation of the `gitman webhook` commands.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use serde::Serialize;

use crate::adapters::webhook_http::WebhookServer;
use crate::cli::output::table::list_table;
use crate::cli::output::{output, CommandOutput};
use crate::domain::models::Config;
use crate::services::webhook_classifier::classify_bytes;
use crate::services::archive_replay::{replay_archive, watch_archive, ArchiveReplayer, ReplayFile};

/// Receive, classify and replay webhook deliveries
#[derive(Args, Debug)]
pub struct WebhookArgs {
    /// Webhook subcommand.
    #[command(subcommand)]
    pub command: WebhookCommands,
}

/// `gitman webhook` subcommands.
#[derive(Subcommand, Debug)]
pub enum WebhookCommands {
    /// Run the webhook receiver
    Serve {
        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,

        /// Address to bind
        #[arg(long)]
        host: Option<String>,
    },

    /// Classify a single JSON payload file
    Classify {
        /// Payload file
        file: PathBuf,
    },

    /// Classify archived deliveries added since the last replay
    Replay {
        /// Archive directory (defaults to webhook.log_dir)
        dir: Option<PathBuf>,

        /// Re-classify every line and leave the replay state alone
        #[arg(long)]
        all: bool,
    },

    /// Classify new archived deliveries as they are written
    Watch {
        /// Archive directory (defaults to webhook.log_dir)
        dir: Option<PathBuf>,
    },
}

/// Result of `gitman webhook classify`.
#[derive(Debug, Serialize)]
pub struct ClassifyOutput {
    /// Payload file.
    pub file: PathBuf,
    /// Event kind name.
    pub kind: String,
    /// Top-level `action`, when the event has one.
    pub action: Option<String>,
    /// `owner/name` of the repository.
    pub repository: String,
    /// Login of the sender.
    pub sender: String,
    /// One-line description.
    pub summary: String,
}

impl CommandOutput for ClassifyOutput {
    fn to_human(&self) -> String {
        format!(
            "{} in {} by {}: {}",
            console::style(&self.kind).cyan().bold(),
            self.repository,
            self.sender,
            self.summary
        )
    }
}

/// Result of `gitman webhook replay`, and of each `watch` batch.
#[derive(Debug, Serialize)]
pub struct ReplayOutput {
    /// Archive directory.
    pub dir: PathBuf,
    /// Only lines past the replay state were classified.
    pub incremental: bool,
    /// Per-file results.
    pub files: Vec<ReplayFile>,
}

impl CommandOutput for ReplayOutput {
    fn to_human(&self) -> String {
        if self.files.is_empty() {
            return if self.incremental {
                format!("No new deliveries in {}", self.dir.display())
            } else {
                format!("No archive files found in {}", self.dir.display())
            };
        }

        let mut table = list_table(&["file", "classified", "skipped", "failed"]);
        for file in &self.files {
            table.add_row(vec![
                file.file.clone(),
                file.classified().to_string(),
                file.skipped.to_string(),
                file.failures.len().to_string(),
            ]);
        }

        let mut lines = vec![table.to_string()];
        for file in &self.files {
            for failure in &file.failures {
                lines.push(format!(
                    "{} {}:{}: {}",
                    console::style("✗").red(),
                    file.file,
                    failure.line,
                    failure.error
                ));
            }
        }
        lines.join("\n")
    }
}

/// Dispatch a `gitman webhook` subcommand.
pub async fn execute(args: WebhookArgs, config: &Config, json_mode: bool) -> Result<()> {
    match args.command {
        WebhookCommands::Serve { port, host } => {
            let mut webhook = config.webhook.clone();
            if let Some(port) = port {
                webhook.port = port;
            }
            if let Some(host) = host {
                webhook.host = host;
            }
            WebhookServer::new(webhook)
                .serve_with_shutdown(async {
                    let _ = tokio::signal::ctrl_c().await;
                    tracing::info!("shutting down webhook receiver");
                })
                .await
                .map_err(|e| anyhow::anyhow!("Webhook receiver failed: {e}"))
        }
        WebhookCommands::Classify { file } => {
            let raw = tokio::fs::read(&file)
                .await
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let event = classify_bytes(&raw)
                .with_context(|| format!("Failed to classify {}", file.display()))?;

            output(
                &ClassifyOutput {
                    file,
                    kind: event.kind().to_string(),
                    action: event.action().map(str::to_string),
                    repository: event.repository().full_name.clone(),
                    sender: event.sender().login.clone(),
                    summary: event.summary(),
                },
                json_mode,
            );
            Ok(())
        }
        WebhookCommands::Replay { dir, all } => {
            let dir = dir.unwrap_or_else(|| config.webhook.log_dir.clone());
            let files = if all {
                replay_archive(&dir).await?
            } else {
                ArchiveReplayer::open(&dir).await?.process_all().await?
            };
            output(
                &ReplayOutput {
                    dir,
                    incremental: !all,
                    files,
                },
                json_mode,
            );
            Ok(())
        }
        WebhookCommands::Watch { dir } => {
            let dir = dir.unwrap_or_else(|| config.webhook.log_dir.clone());
            if !json_mode {
                println!(
                    "Watching {} for new deliveries (Ctrl+C to stop)",
                    console::style(dir.display()).cyan()
                );
            }
            watch_archive(
                &dir,
                async {
                    let _ = tokio::signal::ctrl_c().await;
                },
                |files| {
                    output(
                        &ReplayOutput {
                            dir: dir.clone(),
                            incremental: true,
                            files: files.to_vec(),
                        },
                        json_mode,
                    );
                },
            )
            .await?;
            Ok(())
        }
    }
}
