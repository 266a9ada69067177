//! Suze
//!
//! Entry point of the `suze` command line: loads configuration, sets up
//! logging and runs a single pipeline job.

use clap::Parser;
use std::process::ExitCode;
use tracing::{error, info};

use suze_service::{initialize_logging, load_configuration, Cli, CliHandler};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut config = match load_configuration(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e:#}");
            return ExitCode::FAILURE;
        }
    };
    cli.apply_overrides(&mut config);

    // Held until exit so the file writer flushes
    let _guard = match initialize_logging(&config.logging) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Error: {e:#}");
            return ExitCode::FAILURE;
        }
    };

    info!("Starting Suze v{}", env!("CARGO_PKG_VERSION"));

    let handler = CliHandler::new(config);
    match handler.handle_command(cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}
