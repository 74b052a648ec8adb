use chrono::{DateTime, FixedOffset};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HistorySource {
    /// Generated stand-in for telemetry that does not exist yet.
    Synthetic,
    Observed,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryPoint {
    pub timestamp: DateTime<FixedOffset>,
    pub value: f64,
}

/// Chronological load history, oldest point first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistorySeries {
    pub source: HistorySource,
    pub points: Vec<HistoryPoint>,
}

impl HistorySeries {
    pub fn synthetic(points: Vec<HistoryPoint>) -> Self {
        Self {
            source: HistorySource::Synthetic,
            points,
        }
    }

    pub fn observed(points: Vec<HistoryPoint>) -> Self {
        Self {
            source: HistorySource::Observed,
            points,
        }
    }

    pub fn is_synthetic(&self) -> bool {
        self.source == HistorySource::Synthetic
    }
}
