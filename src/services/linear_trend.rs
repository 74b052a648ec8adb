use chrono::{Duration, NaiveDateTime};

use crate::domain::forecast::ForecastPoint;
use crate::services::forecast_oracle::{ForecastError, ForecastModel, Forecaster};

const MIN_HISTORY_POINTS: usize = 2;

/// Least-squares trend line with an empirical uncertainty band.
///
/// The band half-width is the `interval_width` quantile of the absolute
/// in-sample residuals, widened by `sqrt(1 + k / n)` at the k-th step ahead.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearTrendForecaster {
    pub interval_width: f64,
}

impl Default for LinearTrendForecaster {
    fn default() -> Self {
        Self { interval_width: 0.8 }
    }
}

impl Forecaster for LinearTrendForecaster {
    fn fit(&self, history: &[(NaiveDateTime, f64)]) -> Result<Box<dyn ForecastModel>, ForecastError> {
        if history.len() < MIN_HISTORY_POINTS {
            return Err(ForecastError::InsufficientHistory {
                required: MIN_HISTORY_POINTS,
                actual: history.len(),
            });
        }
        if !(0.0..=1.0).contains(&self.interval_width) {
            return Err(ForecastError::InvalidRequest(format!(
                "interval width must be within [0, 1], got {}",
                self.interval_width
            )));
        }
        if history.iter().any(|(_, value)| !value.is_finite()) {
            return Err(ForecastError::DegenerateHistory(
                "history contains non-finite values".to_string(),
            ));
        }

        let origin = history[0].0;
        let xs: Vec<f64> = history
            .iter()
            .map(|(timestamp, _)| minutes_between(origin, *timestamp))
            .collect();
        let ys: Vec<f64> = history.iter().map(|(_, value)| *value).collect();

        let n = xs.len() as f64;
        let mean_x = xs.iter().sum::<f64>() / n;
        let mean_y = ys.iter().sum::<f64>() / n;
        let sxx: f64 = xs.iter().map(|x| (x - mean_x).powi(2)).sum();
        if sxx <= f64::EPSILON {
            return Err(ForecastError::DegenerateHistory(
                "all history points share one timestamp".to_string(),
            ));
        }
        let sxy: f64 = xs
            .iter()
            .zip(&ys)
            .map(|(x, y)| (x - mean_x) * (y - mean_y))
            .sum();
        let slope = sxy / sxx;
        let intercept = mean_y - slope * mean_x;

        let mut residuals: Vec<f64> = xs
            .iter()
            .zip(&ys)
            .map(|(x, y)| (y - (intercept + slope * x)).abs())
            .collect();
        residuals.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        let half_width = quantile_sorted(&residuals, self.interval_width).unwrap_or(0.0);

        let last = history[history.len() - 1].0;
        Ok(Box::new(LinearTrendModel {
            origin,
            last,
            slope,
            intercept,
            half_width,
            sample_size: history.len(),
        }))
    }
}

struct LinearTrendModel {
    origin: NaiveDateTime,
    last: NaiveDateTime,
    slope: f64,
    intercept: f64,
    half_width: f64,
    sample_size: usize,
}

impl ForecastModel for LinearTrendModel {
    fn predict(&self, periods: usize, interval: Duration) -> Result<Vec<ForecastPoint>, ForecastError> {
        if interval <= Duration::zero() {
            return Err(ForecastError::InvalidRequest("interval must be positive".to_string()));
        }

        let mut points = Vec::with_capacity(periods);
        let mut timestamp = self.last;
        for step in 1..=periods {
            timestamp = timestamp.checked_add_signed(interval).ok_or_else(|| {
                ForecastError::InvalidRequest(format!("forecast step {step} is out of range"))
            })?;
            let estimate = self.intercept + self.slope * minutes_between(self.origin, timestamp);
            let spread =
                self.half_width * (1.0 + step as f64 / self.sample_size as f64).sqrt();
            points.push(ForecastPoint {
                timestamp,
                point_estimate: estimate,
                lower_bound: estimate - spread,
                upper_bound: estimate + spread,
            });
        }
        Ok(points)
    }
}

fn minutes_between(from: NaiveDateTime, to: NaiveDateTime) -> f64 {
    (to - from).num_seconds() as f64 / 60.0
}

/// Nearest-rank quantile of an ascending slice; `None` when empty.
fn quantile_sorted(sorted_values: &[f64], quantile: f64) -> Option<f64> {
    if sorted_values.is_empty() {
        return None;
    }
    let index = if quantile <= 0.0 {
        0
    } else if quantile >= 1.0 {
        sorted_values.len() - 1
    } else {
        (quantile * (sorted_values.len() as f64 - 1.0)).round() as usize
    };
    sorted_values.get(index).copied()
}
