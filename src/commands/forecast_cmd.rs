use std::process::ExitCode;

use chrono::Utc;
use tracing::error;

use crate::commands::base_commands::Commands;
use crate::commands::report_format::format_dashboard_report;
use crate::commands::runtime::{build_rng, build_source, load_config};
use crate::services::linear_trend::LinearTrendForecaster;
use crate::services::refresh_pipeline::{CitySelection, run_refresh_cycle};

pub fn forecast_command(cmd: Commands) -> ExitCode {
    if let Commands::Forecast {
        feed,
        city,
        output,
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

        let selection = match city {
            Some(city) if !config.ratios.contains(&city) => {
                eprintln!("Unknown city: {city}");
                return ExitCode::FAILURE;
            }
            Some(city) => CitySelection::Only(city),
            None => CitySelection::Configured,
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
        let mut rng = build_rng(seed);

        let report = match run_refresh_cycle(
            &config,
            &source,
            &forecaster,
            &selection,
            Utc::now(),
            &mut rng,
        ) {
            Ok(report) => report,
            Err(e) => {
                error!(error = %e, "refresh cycle halted");
                eprintln!("Failed to load grid feed: {e}");
                return ExitCode::FAILURE;
            }
        };

        println!("{}", format_dashboard_report(&report));

        if let Some(output) = output {
            let yaml = match serde_yaml::to_string(&report) {
                Ok(contents) => contents,
                Err(e) => {
                    eprintln!("Failed to serialize forecast report: {e}");
                    return ExitCode::FAILURE;
                }
            };
            if let Err(e) = std::fs::write(&output, yaml) {
                eprintln!("Failed to write forecast report: {e}");
                return ExitCode::FAILURE;
            }
            println!("Forecast report written to {output}");
        }
        return ExitCode::SUCCESS;
    }
    ExitCode::FAILURE
}
