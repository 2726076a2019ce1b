//! ecsctl - inspect ECS clusters, exec into containers and stream their logs.

use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use ecsctl::cli::Cli;
use ecsctl::commands;
use ecsctl::config::Config;
use ecsctl::output::Console;

/// Application entry point.
///
/// Sets up logging, loads the config file and runs the command. Any error is
/// printed as `Error: <message>` and the process exits with status 1.
#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    let result = match Config::load() {
        Ok(config) => commands::run(cli, config).await,
        Err(err) => Err(err),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::debug!(error = ?err, "Command failed");
            Console::default().error(&format!("{err:#}"));
            ExitCode::FAILURE
        }
    }
}

/// `RUST_LOG` wins; otherwise warnings only, or debug output for ecsctl with `--debug`.
fn init_tracing(debug: bool) {
    let default = if debug { "warn,ecsctl=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
