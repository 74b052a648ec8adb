use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SnapshotError {
    #[error("peak load must be a finite non-negative number, got {0}")]
    InvalidPeakLoad(f64),
    #[error("utilization rate must be within [0, 100], got {0}")]
    InvalidUtilizationRate(f64),
}

/// National grid state as reported by the feed at one point in time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GridSnapshot {
    current_peak_load_mw: f64,
    utilization_rate_percent: f64,
    observed_at: DateTime<Utc>,
}

impl GridSnapshot {
    pub fn new(
        current_peak_load_mw: f64,
        utilization_rate_percent: f64,
        observed_at: DateTime<Utc>,
    ) -> Result<Self, SnapshotError> {
        if !current_peak_load_mw.is_finite() || current_peak_load_mw < 0.0 {
            return Err(SnapshotError::InvalidPeakLoad(current_peak_load_mw));
        }
        if !utilization_rate_percent.is_finite()
            || !(0.0..=100.0).contains(&utilization_rate_percent)
        {
            return Err(SnapshotError::InvalidUtilizationRate(utilization_rate_percent));
        }
        Ok(Self {
            current_peak_load_mw,
            utilization_rate_percent,
            observed_at,
        })
    }

    pub fn current_peak_load_mw(&self) -> f64 {
        self.current_peak_load_mw
    }

    pub fn utilization_rate_percent(&self) -> f64 {
        self.utilization_rate_percent
    }

    pub fn observed_at(&self) -> DateTime<Utc> {
        self.observed_at
    }
}
