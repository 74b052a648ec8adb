use std::collections::BTreeMap;
use std::fs;

use chrono::{Duration, FixedOffset, Offset, Utc};
use serde::Deserialize;
use thiserror::Error;

use crate::domain::city_allocation::RatioTable;
use crate::services::forecast_oracle::ForecastRequest;
use crate::services::history_generator::HistoryShape;

pub const DEFAULT_FEED_URL: &str = "https://restless-sunset-f1b0.bblong-chen.workers.dev/";

/// Upper bound for history and forecast step sizes (one week).
pub const MAX_INTERVAL_MINUTES: u32 = 7 * 24 * 60;
/// Upper bound for history point counts and forecast periods.
pub const MAX_SERIES_POINTS: usize = 10_000;
/// Upper bound for the timeout, cache and refresh windows (one year).
pub const MAX_WINDOW_SECS: u64 = 366 * 24 * 3600;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Read(#[from] std::io::Error),
    #[error("failed to parse config yaml: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HistorySettings {
    pub point_count: usize,
    pub interval_minutes: u32,
    pub noise_level: f64,
    /// Per-city base loads that replace the allocated peak load as the centre of the synthetic series.
    pub base_loads: BTreeMap<String, f64>,
}

impl Default for HistorySettings {
    fn default() -> Self {
        Self {
            point_count: 30,
            interval_minutes: 10,
            noise_level: 0.05,
            base_loads: BTreeMap::new(),
        }
    }
}

impl HistorySettings {
    pub fn shape(&self) -> HistoryShape {
        HistoryShape {
            point_count: self.point_count,
            interval_minutes: self.interval_minutes,
            noise_level: self.noise_level,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ForecastSettings {
    pub periods: usize,
    pub interval_minutes: u32,
    pub interval_width: f64,
    /// Cities to forecast; empty means every city of the ratio table.
    pub cities: Vec<String>,
    pub include_national: bool,
}

impl Default for ForecastSettings {
    fn default() -> Self {
        Self {
            periods: 6,
            interval_minutes: 60,
            interval_width: 0.8,
            cities: Vec::new(),
            include_national: false,
        }
    }
}

impl ForecastSettings {
    pub fn request(&self) -> ForecastRequest {
        ForecastRequest {
            periods: self.periods,
            interval: Duration::minutes(i64::from(self.interval_minutes)),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub feed_url: String,
    pub timeout_secs: u64,
    pub cache_ttl_secs: u64,
    pub refresh_interval_secs: u64,
    pub utc_offset_hours: i32,
    pub ratios: RatioTable,
    pub history: HistorySettings,
    pub forecast: ForecastSettings,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            feed_url: DEFAULT_FEED_URL.to_string(),
            timeout_secs: 10,
            cache_ttl_secs: 600,
            refresh_interval_secs: 600,
            utc_offset_hours: 8,
            ratios: RatioTable::default(),
            history: HistorySettings::default(),
            forecast: ForecastSettings::default(),
        }
    }
}

impl DashboardConfig {
    pub fn from_yaml_file(filepath: &str) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(filepath)?;
        Self::from_yaml_str(&contents)
    }

    pub fn from_yaml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: DashboardConfig = serde_yaml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads `path` when given, otherwise falls back to the built-in defaults.
    pub fn load(path: Option<&str>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::from_yaml_file(path),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.feed_url.trim().is_empty() {
            return Err(ConfigError::Invalid("feed_url must not be empty".to_string()));
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::Invalid("timeout_secs must be greater than zero".to_string()));
        }
        for (name, secs) in [
            ("timeout_secs", self.timeout_secs),
            ("cache_ttl_secs", self.cache_ttl_secs),
            ("refresh_interval_secs", self.refresh_interval_secs),
        ] {
            if secs > MAX_WINDOW_SECS {
                return Err(ConfigError::Invalid(format!(
                    "{name} must be at most {MAX_WINDOW_SECS}, got {secs}"
                )));
            }
        }
        if self.parse_offset().is_none() {
            return Err(ConfigError::Invalid(format!(
                "utc_offset_hours {} is not a valid offset",
                self.utc_offset_hours
            )));
        }
        if self.history.point_count == 0 || self.history.interval_minutes == 0 {
            return Err(ConfigError::Invalid(
                "history point_count and interval_minutes must be greater than zero".to_string(),
            ));
        }
        check_series_bounds("history", self.history.point_count, self.history.interval_minutes)?;
        if !(0.0..1.0).contains(&self.history.noise_level) {
            return Err(ConfigError::Invalid("history noise_level must be within [0, 1)".to_string()));
        }
        if self.forecast.periods == 0 || self.forecast.interval_minutes == 0 {
            return Err(ConfigError::Invalid(
                "forecast periods and interval_minutes must be greater than zero".to_string(),
            ));
        }
        check_series_bounds("forecast", self.forecast.periods, self.forecast.interval_minutes)?;
        if !(0.0..=1.0).contains(&self.forecast.interval_width) {
            return Err(ConfigError::Invalid("forecast interval_width must be within [0, 1]".to_string()));
        }
        if let Some(unknown) = self
            .forecast
            .cities
            .iter()
            .find(|city| !self.ratios.contains(city))
        {
            return Err(ConfigError::Invalid(format!("forecast city {unknown} has no ratio")));
        }
        Ok(())
    }

    /// Timezone that timestamps are normalized to; UTC if the configured offset is unusable.
    pub fn reference_offset(&self) -> FixedOffset {
        self.parse_offset().unwrap_or_else(|| Utc.fix())
    }

    fn parse_offset(&self) -> Option<FixedOffset> {
        FixedOffset::east_opt(self.utc_offset_hours.checked_mul(3600)?)
    }

    pub fn timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.timeout_secs)
    }

    /// Saturates at [`Duration::MAX`] for windows chrono cannot represent.
    pub fn cache_ttl(&self) -> Duration {
        i64::try_from(self.cache_ttl_secs)
            .ok()
            .and_then(Duration::try_seconds)
            .unwrap_or(Duration::MAX)
    }

    pub fn refresh_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.refresh_interval_secs)
    }
}

fn check_series_bounds(section: &str, count: usize, interval_minutes: u32) -> Result<(), ConfigError> {
    if count > MAX_SERIES_POINTS {
        return Err(ConfigError::Invalid(format!(
            "{section} length must be at most {MAX_SERIES_POINTS}, got {count}"
        )));
    }
    if interval_minutes > MAX_INTERVAL_MINUTES {
        return Err(ConfigError::Invalid(format!(
            "{section} interval_minutes must be at most {MAX_INTERVAL_MINUTES}, got {interval_minutes}"
        )));
    }
    Ok(())
}
