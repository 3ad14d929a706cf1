//! gitman CLI entry point.

use clap::Parser;

use gitman::cli::{self, Cli, Commands};
use gitman::infrastructure::logging::LoggerImpl;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match cli::load_config(&cli) {
        Ok(config) => config,
        Err(err) => cli::handle_error(&err, cli.json),
    };

    let _logger = match LoggerImpl::init(&config.logging) {
        Ok(logger) => logger,
        Err(err) => cli::handle_error(&err, cli.json),
    };

    let json = cli.json;
    let result = match cli.command {
        Commands::Init(args) => cli::commands::init::execute(args, &config, json).await,
        Commands::Sync(args) => cli::commands::sync::execute(args, &config, json).await,
        Commands::Status(args) => cli::commands::status::execute(args, &config, json).await,
        Commands::Webhook(args) => cli::commands::webhook::execute(args, &config, json).await,
    };

    if let Err(err) = result {
        cli::handle_error(&err, json);
    }
}
