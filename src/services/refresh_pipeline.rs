use chrono::{DateTime, FixedOffset, Utc};
use rand::Rng;
use serde::Serialize;
use tracing::{info, warn};

use crate::domain::city_allocation::CityAllocation;
use crate::domain::forecast::CityForecast;
use crate::domain::history::HistorySource;
use crate::services::allocator::allocate;
use crate::services::dashboard_config::DashboardConfig;
use crate::services::feed_client::{FeedError, SnapshotSource};
use crate::services::forecast_oracle::{Forecaster, forecast_series};
use crate::services::history_generator::generate_history_with_rng;
use crate::services::snapshot_table::SnapshotTable;

pub const NATIONAL_SERIES_NAME: &str = "全國";

#[derive(Serialize, Debug, Clone)]
pub struct DashboardReport {
    pub snapshot: SnapshotTable,
    pub allocations: Vec<CityAllocation>,
    pub forecasts: Vec<CityForecast>,
}

/// Which series a cycle forecasts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CitySelection {
    /// Cities listed in the config, or every city when none are listed.
    Configured,
    Only(String),
}

/// Runs one refresh cycle from scratch: fetch, allocate, synthesize, forecast.
///
/// A feed failure ends the cycle and is returned to the caller; no partial
/// dashboard is produced. Failures while forecasting a single city are kept
/// on that city's entry and the remaining cities are still processed.
pub fn run_refresh_cycle<S, F, R>(
    config: &DashboardConfig,
    source: &S,
    forecaster: &F,
    selection: &CitySelection,
    now: DateTime<Utc>,
    rng: &mut R,
) -> Result<DashboardReport, FeedError>
where
    S: SnapshotSource + ?Sized,
    F: Forecaster + ?Sized,
    R: Rng + ?Sized,
{
    let offset = config.reference_offset();
    let snapshot = source.fetch_snapshot()?;
    let allocations = allocate(&snapshot, &config.ratios);
    info!(
        peak_load_mw = snapshot.current_peak_load_mw(),
        observed_at = %snapshot.observed_at(),
        cities = allocations.len(),
        "allocated national load"
    );

    let mut targets: Vec<(String, f64)> = Vec::new();
    if config.forecast.include_national && *selection == CitySelection::Configured {
        targets.push((
            NATIONAL_SERIES_NAME.to_string(),
            snapshot.current_peak_load_mw(),
        ));
    }
    for allocation in &allocations {
        if is_selected(config, selection, &allocation.city_name) {
            let base = config
                .history
                .base_loads
                .get(&allocation.city_name)
                .copied()
                .unwrap_or(allocation.peak_load_mw);
            targets.push((allocation.city_name.clone(), base));
        }
    }

    let end = now.with_timezone(&offset);
    let forecasts = targets
        .into_iter()
        .map(|(city, base_value)| {
            forecast_city(config, forecaster, city, base_value, end, offset, &mut *rng)
        })
        .collect();

    Ok(DashboardReport {
        snapshot: SnapshotTable::from_snapshot(&snapshot, offset),
        allocations,
        forecasts,
    })
}

fn forecast_city<F: Forecaster + ?Sized, R: Rng + ?Sized>(
    config: &DashboardConfig,
    forecaster: &F,
    city: String,
    base_value: f64,
    end: DateTime<FixedOffset>,
    offset: FixedOffset,
    rng: &mut R,
) -> CityForecast {
    let outcome = generate_history_with_rng(base_value, config.history.shape(), end, rng)
        .map_err(|e| e.to_string())
        .and_then(|series| {
            forecast_series(forecaster, &series, config.forecast.request(), offset)
                .map(|points| (series.source, points))
                .map_err(|e| e.to_string())
        });

    match outcome {
        Ok((history_source, points)) => CityForecast {
            city,
            history_source,
            base_value,
            points,
            error: None,
        },
        Err(message) => {
            warn!(city = %city, error = %message, "forecast failed");
            CityForecast {
                city,
                history_source: HistorySource::Synthetic,
                base_value,
                points: Vec::new(),
                error: Some(message),
            }
        }
    }
}

fn is_selected(config: &DashboardConfig, selection: &CitySelection, city: &str) -> bool {
    match selection {
        CitySelection::Only(name) => name == city,
        CitySelection::Configured => {
            config.forecast.cities.is_empty() || config.forecast.cities.iter().any(|c| c == city)
        }
    }
}
