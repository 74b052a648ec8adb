use chrono::{DateTime, Duration, FixedOffset};
use rand::Rng;
use rand_distr::{Distribution, Uniform};
use thiserror::Error;

use crate::domain::history::{HistoryPoint, HistorySeries};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum HistoryError {
    #[error("point count must be greater than zero")]
    InvalidPointCount,
    #[error("interval must be greater than zero minutes")]
    InvalidInterval,
    #[error("noise level must be within [0, 1), got {0}")]
    InvalidNoiseLevel(f64),
    #[error("base value must be a finite non-negative number, got {0}")]
    InvalidBaseValue(f64),
    #[error("history reaching {steps_back} steps of {interval_minutes} minutes back is out of range")]
    TimestampOutOfRange { steps_back: usize, interval_minutes: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistoryShape {
    pub point_count: usize,
    pub interval_minutes: u32,
    pub noise_level: f64,
}

/// Builds a synthetic series of `shape.point_count` values scattered
/// uniformly within `±noise_level` of `base_value`. The last point sits at
/// `end` and earlier points step back by `shape.interval_minutes`.
pub(crate) fn generate_history_with_rng<R: Rng + ?Sized>(
    base_value: f64,
    shape: HistoryShape,
    end: DateTime<FixedOffset>,
    rng: &mut R,
) -> Result<HistorySeries, HistoryError> {
    if shape.point_count == 0 {
        return Err(HistoryError::InvalidPointCount);
    }
    if shape.interval_minutes == 0 {
        return Err(HistoryError::InvalidInterval);
    }
    if !(0.0..1.0).contains(&shape.noise_level) {
        return Err(HistoryError::InvalidNoiseLevel(shape.noise_level));
    }
    if !base_value.is_finite() || base_value < 0.0 {
        return Err(HistoryError::InvalidBaseValue(base_value));
    }

    let noise = Uniform::new_inclusive(-shape.noise_level, shape.noise_level);

    let mut points = Vec::new();
    for steps_back in (0..shape.point_count).rev() {
        points.push(HistoryPoint {
            timestamp: step_back(end, steps_back, shape.interval_minutes)?,
            value: base_value * (1.0 + noise.sample(rng)),
        });
    }

    Ok(HistorySeries::synthetic(points))
}

fn step_back(
    end: DateTime<FixedOffset>,
    steps_back: usize,
    interval_minutes: u32,
) -> Result<DateTime<FixedOffset>, HistoryError> {
    i64::try_from(steps_back)
        .ok()
        .and_then(|steps| steps.checked_mul(i64::from(interval_minutes)))
        .and_then(Duration::try_minutes)
        .and_then(|offset| end.checked_sub_signed(offset))
        .ok_or(HistoryError::TimestampOutOfRange {
            steps_back,
            interval_minutes,
        })
}
