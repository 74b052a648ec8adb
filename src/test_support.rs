use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, FixedOffset, NaiveDateTime, TimeZone, Utc};

use crate::domain::forecast::ForecastPoint;
use crate::domain::grid_snapshot::GridSnapshot;
use crate::services::feed_client::{FeedError, SnapshotSource};
use crate::services::fetch_cache::Clock;
use crate::services::forecast_oracle::{ForecastError, ForecastModel, Forecaster};

pub fn utc_noon() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 17, 4, 0, 0).unwrap()
}

pub fn taipei_offset() -> FixedOffset {
    FixedOffset::east_opt(8 * 3600).unwrap()
}

/// 2026-10-17 12:00 in Taipei, the same instant as [`utc_noon`].
pub fn taipei_noon() -> DateTime<FixedOffset> {
    utc_noon().with_timezone(&taipei_offset())
}

pub fn snapshot_at(load: f64, rate: f64, observed_at: DateTime<Utc>) -> GridSnapshot {
    GridSnapshot::new(load, rate, observed_at).unwrap()
}

pub fn snapshot_at_noon(load: f64, rate: f64) -> GridSnapshot {
    snapshot_at(load, rate, utc_noon())
}

// Clock that only moves when told to. Clones share the same time.
#[derive(Clone)]
pub struct ManualClock {
    now: Arc<Mutex<DateTime<Utc>>>,
}

impl ManualClock {
    pub fn starting_at_noon() -> Self {
        Self {
            now: Arc::new(Mutex::new(utc_noon())),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap();
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

// Hands out the scripted results in order and counts calls.
pub struct ScriptedSource {
    results: RefCell<VecDeque<Result<GridSnapshot, FeedError>>>,
    calls: Cell<usize>,
}

impl ScriptedSource {
    pub fn new(results: Vec<Result<GridSnapshot, FeedError>>) -> Self {
        Self {
            results: RefCell::new(results.into()),
            calls: Cell::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.get()
    }
}

impl SnapshotSource for ScriptedSource {
    fn fetch_snapshot(&self) -> Result<GridSnapshot, FeedError> {
        self.calls.set(self.calls.get() + 1);
        self.results
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Err(FeedError::Connection("script exhausted".to_string())))
    }
}

// Canned oracle: constant estimate and band, with knobs to break its output.
pub struct StubForecaster {
    estimate: f64,
    lower: f64,
    upper: f64,
    truncate_to: Option<usize>,
    shift: Duration,
    fail_above: Option<f64>,
    seen: RefCell<Vec<(NaiveDateTime, f64)>>,
}

impl StubForecaster {
    pub fn flat(estimate: f64) -> Self {
        Self::with_band(estimate, estimate - 1.0, estimate + 1.0)
    }

    pub fn with_band(estimate: f64, lower: f64, upper: f64) -> Self {
        Self {
            estimate,
            lower,
            upper,
            truncate_to: None,
            shift: Duration::zero(),
            fail_above: None,
            seen: RefCell::new(Vec::new()),
        }
    }

    pub fn truncated_to(mut self, count: usize) -> Self {
        self.truncate_to = Some(count);
        self
    }

    pub fn starting_after(mut self, shift: Duration) -> Self {
        self.shift = shift;
        self
    }

    pub fn failing_above(mut self, limit: f64) -> Self {
        self.fail_above = Some(limit);
        self
    }

    pub fn seen_history(&self) -> Vec<(NaiveDateTime, f64)> {
        self.seen.borrow().clone()
    }
}

struct StubModel {
    start: NaiveDateTime,
    estimate: f64,
    lower: f64,
    upper: f64,
    truncate_to: Option<usize>,
}

impl Forecaster for StubForecaster {
    fn fit(&self, history: &[(NaiveDateTime, f64)]) -> Result<Box<dyn ForecastModel>, ForecastError> {
        self.seen.borrow_mut().extend_from_slice(history);
        if let Some(limit) = self.fail_above {
            if history.iter().any(|(_, value)| *value > limit) {
                return Err(ForecastError::DegenerateHistory(format!("value above {limit}")));
            }
        }
        let last = history.last().ok_or(ForecastError::EmptyHistory)?.0;
        Ok(Box::new(StubModel {
            start: last + self.shift,
            estimate: self.estimate,
            lower: self.lower,
            upper: self.upper,
            truncate_to: self.truncate_to,
        }))
    }
}

impl ForecastModel for StubModel {
    fn predict(&self, periods: usize, interval: Duration) -> Result<Vec<ForecastPoint>, ForecastError> {
        let count = self.truncate_to.unwrap_or(periods);
        Ok((1..=count)
            .map(|step| ForecastPoint {
                timestamp: self.start + interval * step as i32,
                point_estimate: self.estimate,
                lower_bound: self.lower,
                upper_bound: self.upper,
            })
            .collect())
    }
}
