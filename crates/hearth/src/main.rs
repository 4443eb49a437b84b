mod cli;
mod commands;
mod error;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.global.verbose);

    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    use hearth_core::ServiceAction;

    tracing::debug!(command = ?cli.command, "dispatching command");

    match cli.command {
        Command::Login { url, token } => commands::login(&url, &token),
        Command::Entities => commands::entities(&cli.global).await,
        Command::State { entity_id } => commands::state(&cli.global, &entity_id).await,
        Command::Toggle { entity_id } => {
            commands::command(&cli.global, &entity_id, ServiceAction::Toggle).await
        }
        Command::On { entity_id } => {
            commands::command(&cli.global, &entity_id, ServiceAction::TurnOn).await
        }
        Command::Off { entity_id } => {
            commands::command(&cli.global, &entity_id, ServiceAction::TurnOff).await
        }
        Command::Watch => commands::watch(&cli.global).await,
    }
}
