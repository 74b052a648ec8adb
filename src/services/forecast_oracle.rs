use chrono::{DateTime, Duration, FixedOffset, NaiveDateTime};
use thiserror::Error;
use tracing::debug;

use crate::domain::forecast::ForecastPoint;
use crate::domain::history::HistorySeries;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ForecastError {
    #[error("history is empty")]
    EmptyHistory,
    #[error("history needs at least {required} points, got {actual}")]
    InsufficientHistory { required: usize, actual: usize },
    #[error("history contains duplicate timestamp {0}")]
    DuplicateTimestamp(NaiveDateTime),
    #[error("history is not in chronological order at {0}")]
    UnorderedHistory(NaiveDateTime),
    #[error("history is degenerate: {0}")]
    DegenerateHistory(String),
    #[error("invalid forecast request: {0}")]
    InvalidRequest(String),
    #[error("oracle returned malformed output: {0}")]
    MalformedOutput(String),
}

/// A fitted model able to extend its history into the future.
pub trait ForecastModel {
    fn predict(&self, periods: usize, interval: Duration) -> Result<Vec<ForecastPoint>, ForecastError>;
}

/// Forecasting oracle. Only sees naive timestamps, oldest first, with no duplicates.
pub trait Forecaster {
    fn fit(&self, history: &[(NaiveDateTime, f64)]) -> Result<Box<dyn ForecastModel>, ForecastError>;
}

impl<F: Forecaster + ?Sized> Forecaster for &F {
    fn fit(&self, history: &[(NaiveDateTime, f64)]) -> Result<Box<dyn ForecastModel>, ForecastError> {
        (**self).fit(history)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForecastRequest {
    pub periods: usize,
    pub interval: Duration,
}

/// Expresses `timestamp` in `reference` and drops the offset.
pub fn to_reference_naive(timestamp: &DateTime<FixedOffset>, reference: FixedOffset) -> NaiveDateTime {
    timestamp.with_timezone(&reference).naive_local()
}

/// Runs `forecaster` over `series` and checks the shape of what comes back.
///
/// History timestamps are normalized to `reference` before fitting; returned
/// timestamps are read in that same frame. The result must hold exactly
/// `request.periods` points, the first one `request.interval` after the last
/// history point and each following one a further interval later.
pub fn forecast_series<F: Forecaster + ?Sized>(
    forecaster: &F,
    series: &HistorySeries,
    request: ForecastRequest,
    reference: FixedOffset,
) -> Result<Vec<ForecastPoint>, ForecastError> {
    if request.periods == 0 {
        return Err(ForecastError::InvalidRequest("periods must be greater than zero".to_string()));
    }
    if request.interval <= Duration::zero() {
        return Err(ForecastError::InvalidRequest("interval must be positive".to_string()));
    }

    let history = normalize_history(series, reference)?;
    let last = history
        .last()
        .map(|(timestamp, _)| *timestamp)
        .ok_or(ForecastError::EmptyHistory)?;

    let model = forecaster.fit(&history)?;
    let points = model.predict(request.periods, request.interval)?;

    if points.len() != request.periods {
        return Err(ForecastError::MalformedOutput(format!(
            "expected {} points, got {}",
            request.periods,
            points.len()
        )));
    }
    let mut expected = last;
    for point in &points {
        expected = expected.checked_add_signed(request.interval).ok_or_else(|| {
            ForecastError::InvalidRequest("forecast horizon is out of range".to_string())
        })?;
        if point.timestamp != expected {
            return Err(ForecastError::MalformedOutput(format!(
                "expected timestamp {expected}, got {}",
                point.timestamp
            )));
        }
        if !point.is_band_ordered() {
            debug!(timestamp = %point.timestamp, "forecast band does not bracket the estimate");
        }
    }

    Ok(points)
}

fn normalize_history(
    series: &HistorySeries,
    reference: FixedOffset,
) -> Result<Vec<(NaiveDateTime, f64)>, ForecastError> {
    if series.points.is_empty() {
        return Err(ForecastError::EmptyHistory);
    }

    let mut history: Vec<(NaiveDateTime, f64)> = Vec::with_capacity(series.points.len());
    for point in &series.points {
        let timestamp = to_reference_naive(&point.timestamp, reference);
        if let Some((previous, _)) = history.last() {
            if timestamp == *previous {
                return Err(ForecastError::DuplicateTimestamp(timestamp));
            }
            if timestamp < *previous {
                return Err(ForecastError::UnorderedHistory(timestamp));
            }
        }
        history.push((timestamp, point.value));
    }
    Ok(history)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::history::HistoryPoint;
    use crate::services::history_generator::{HistoryShape, generate_history_with_rng};
    use crate::services::linear_trend::LinearTrendForecaster;
    use crate::test_support::{StubForecaster, taipei_noon, taipei_offset};
    use chrono::TimeZone;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn request(periods: usize, minutes: i64) -> ForecastRequest {
        ForecastRequest {
            periods,
            interval: Duration::minutes(minutes),
        }
    }

    fn observed(points: &[(DateTime<FixedOffset>, f64)]) -> HistorySeries {
        HistorySeries::observed(
            points
                .iter()
                .map(|(timestamp, value)| HistoryPoint {
                    timestamp: *timestamp,
                    value: *value,
                })
                .collect(),
        )
    }

    #[test]
    fn forecast_series_returns_requested_future_steps() {
        let mut rng = StdRng::seed_from_u64(11);
        let shape = HistoryShape {
            point_count: 48,
            interval_minutes: 10,
            noise_level: 0.05,
        };
        let series = generate_history_with_rng(3600.0, shape, taipei_noon(), &mut rng).unwrap();

        let points =
            forecast_series(&LinearTrendForecaster::default(), &series, request(6, 10), taipei_offset())
                .unwrap();

        let last = to_reference_naive(&taipei_noon(), taipei_offset());
        assert_eq!(points.len(), 6);
        assert!(points[0].timestamp > last);
        for (step, point) in points.iter().enumerate() {
            assert_eq!(point.timestamp, last + Duration::minutes(10 * (step as i64 + 1)));
        }
    }

    #[test]
    fn forecast_series_strips_offsets_into_reference_frame() {
        let utc = FixedOffset::east_opt(0).unwrap();
        let first = utc.with_ymd_and_hms(2026, 10, 17, 3, 50, 0).unwrap();
        let second = utc.with_ymd_and_hms(2026, 10, 17, 4, 0, 0).unwrap();
        let series = observed(&[(first, 10.0), (second, 12.0)]);

        let stub = StubForecaster::flat(5.0);
        forecast_series(&stub, &series, request(1, 10), taipei_offset()).unwrap();

        let seen = stub.seen_history();
        assert_eq!(seen[1].0, to_reference_naive(&taipei_noon(), taipei_offset()));
        assert_eq!(seen[1].0.format("%H:%M").to_string(), "12:00");
    }

    #[test]
    fn forecast_series_tolerates_inverted_bands() {
        let series = observed(&[(taipei_noon(), 1.0)]);
        let stub = StubForecaster::with_band(5.0, 9.0, 1.0);
        let points = forecast_series(&stub, &series, request(2, 60), taipei_offset()).unwrap();
        assert_eq!(points.len(), 2);
        assert!(!points[0].is_band_ordered());
    }

    #[test]
    fn forecast_series_rejects_duplicate_and_unordered_history() {
        let noon = taipei_noon();
        let duplicate = observed(&[(noon, 1.0), (noon, 2.0)]);
        assert!(matches!(
            forecast_series(&StubForecaster::flat(1.0), &duplicate, request(1, 10), taipei_offset()),
            Err(ForecastError::DuplicateTimestamp(_))
        ));

        let unordered = observed(&[(noon, 1.0), (noon - Duration::minutes(10), 2.0)]);
        assert!(matches!(
            forecast_series(&StubForecaster::flat(1.0), &unordered, request(1, 10), taipei_offset()),
            Err(ForecastError::UnorderedHistory(_))
        ));
    }

    #[test]
    fn forecast_series_rejects_empty_history_and_bad_requests() {
        let empty = HistorySeries::observed(vec![]);
        assert_eq!(
            forecast_series(&StubForecaster::flat(1.0), &empty, request(1, 10), taipei_offset()),
            Err(ForecastError::EmptyHistory)
        );

        let series = observed(&[(taipei_noon(), 1.0)]);
        assert!(matches!(
            forecast_series(&StubForecaster::flat(1.0), &series, request(0, 10), taipei_offset()),
            Err(ForecastError::InvalidRequest(_))
        ));
        assert!(matches!(
            forecast_series(&StubForecaster::flat(1.0), &series, request(3, 0), taipei_offset()),
            Err(ForecastError::InvalidRequest(_))
        ));
    }

    #[test]
    fn forecast_series_rejects_misshapen_oracle_output() {
        let series = observed(&[(taipei_noon(), 1.0)]);

        let short = StubForecaster::flat(1.0).truncated_to(2);
        assert!(matches!(
            forecast_series(&short, &series, request(3, 10), taipei_offset()),
            Err(ForecastError::MalformedOutput(_))
        ));

        let shifted = StubForecaster::flat(1.0).starting_after(Duration::minutes(-10));
        assert!(matches!(
            forecast_series(&shifted, &series, request(3, 10), taipei_offset()),
            Err(ForecastError::MalformedOutput(_))
        ));
    }

    #[test]
    fn forecast_series_passes_through_oracle_failures() {
        let series = observed(&[(taipei_noon(), 1.0)]);
        assert!(matches!(
            forecast_series(&LinearTrendForecaster::default(), &series, request(3, 10), taipei_offset()),
            Err(ForecastError::InsufficientHistory { required: 2, actual: 1 })
        ));
    }
}
