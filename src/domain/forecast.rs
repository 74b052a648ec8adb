use chrono::NaiveDateTime;
use serde::Serialize;

use crate::domain::history::HistorySource;

/// One future step returned by a forecasting oracle.
///
/// Timestamps are naive and expressed in the reference timezone used at the
/// oracle boundary. Bands are taken as returned; `lower_bound <= point_estimate
/// <= upper_bound` is not guaranteed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastPoint {
    pub timestamp: NaiveDateTime,
    pub point_estimate: f64,
    pub lower_bound: f64,
    pub upper_bound: f64,
}

impl ForecastPoint {
    pub fn is_band_ordered(&self) -> bool {
        self.lower_bound <= self.point_estimate && self.point_estimate <= self.upper_bound
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CityForecast {
    pub city: String,
    pub history_source: HistorySource,
    pub base_value: f64,
    pub points: Vec<ForecastPoint>,
    pub error: Option<String>,
}
