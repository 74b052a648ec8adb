use std::process::ExitCode;

use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use grid_forecasts::commands::base_commands::{CliArgs, Commands};
use grid_forecasts::commands::forecast_cmd::forecast_command;
use grid_forecasts::commands::snapshot_cmd::snapshot_command;
use grid_forecasts::commands::watch_cmd::watch_command;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = CliArgs::parse();
    match args.command {
        cmd @ (Commands::Snapshot { .. } | Commands::Allocate { .. }) => snapshot_command(cmd),
        cmd @ Commands::Forecast { .. } => forecast_command(cmd),
        cmd @ Commands::Watch { .. } => watch_command(cmd),
        Commands::Completions { shell } => {
            let mut command = CliArgs::command();
            let name = command.get_name().to_string();
            clap_complete::generate(shell, &mut command, name, &mut std::io::stdout());
            ExitCode::SUCCESS
        }
    }
}
