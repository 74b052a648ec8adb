use std::process::ExitCode;
use std::thread;

use chrono::Utc;
use tracing::{error, info};

use crate::commands::base_commands::Commands;
use crate::commands::report_format::format_dashboard_report;
use crate::commands::runtime::{build_rng, build_source, load_config};
use crate::services::linear_trend::LinearTrendForecaster;
use crate::services::refresh_pipeline::{CitySelection, run_refresh_cycle};

/// Runs refresh cycles back to back, sleeping in between. A failed cycle is
/// reported and the loop moves on to the next one.
pub fn watch_command(cmd: Commands) -> ExitCode {
    if let Commands::Watch {
        feed,
        cycles,
        interval_secs,
        seed,
    } = cmd
    {
        let config = match load_config(&feed) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Failed to load dashboard config: {e}");
                return ExitCode::FAILURE;
            }
        };
        let source = match build_source(&config) {
            Ok(source) => source,
            Err(e) => {
                eprintln!("Failed to create feed client: {e}");
                return ExitCode::FAILURE;
            }
        };
        let forecaster = LinearTrendForecaster {
            interval_width: config.forecast.interval_width,
        };
        let interval = interval_secs
            .map(std::time::Duration::from_secs)
            .unwrap_or_else(|| config.refresh_interval());
        let mut rng = build_rng(seed);

        let mut cycle = 0usize;
        loop {
            cycle += 1;
            info!(cycle, "starting refresh cycle");
            match run_refresh_cycle(
                &config,
                &source,
                &forecaster,
                &CitySelection::Configured,
                Utc::now(),
                &mut rng,
            ) {
                Ok(report) => {
                    println!("Refresh cycle {cycle}");
                    println!("{}", format_dashboard_report(&report));
                }
                Err(e) => {
                    error!(cycle, fetch_failure = e.is_fetch_error(), error = %e, "refresh cycle halted");
                    eprintln!("Refresh cycle {cycle} failed: {e}");
                }
            }

            if cycles.is_some_and(|limit| cycle >= limit) {
                break;
            }
            thread::sleep(interval);
        }
        return ExitCode::SUCCESS;
    }
    ExitCode::FAILURE
}
