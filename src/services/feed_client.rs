use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::blocking::Client;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info};

use crate::domain::grid_snapshot::GridSnapshot;

#[derive(Error, Debug)]
pub enum FeedError {
    #[error("connection error: {0}")]
    Connection(String),
    #[error("request timed out after {0:?}")]
    Timeout(Duration),
    #[error("feed responded with HTTP status {0}")]
    Status(u16),
    #[error("parse error: {0}")]
    Parse(String),
}

impl FeedError {
    /// Network-side failures, as opposed to a payload that could not be understood.
    pub fn is_fetch_error(&self) -> bool {
        !matches!(self, FeedError::Parse(_))
    }
}

/// Describes an interface for retrieving the current national grid state.
pub trait SnapshotSource {
    fn fetch_snapshot(&self) -> Result<GridSnapshot, FeedError>;
}

impl<S: SnapshotSource + ?Sized> SnapshotSource for &S {
    fn fetch_snapshot(&self) -> Result<GridSnapshot, FeedError> {
        (**self).fetch_snapshot()
    }
}

pub struct HttpFeedClient {
    url: String,
    timeout: Duration,
    client: Client,
}

impl HttpFeedClient {
    pub fn new(url: &str, timeout: Duration) -> Result<Self, FeedError> {
        if url.trim().is_empty() {
            return Err(FeedError::Connection("feed url is empty".to_string()));
        }
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FeedError::Connection(e.to_string()))?;
        Ok(Self {
            url: url.to_string(),
            timeout,
            client,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn fetch_json(&self) -> Result<Value, FeedError> {
        let response = self.client.get(&self.url).send().map_err(|e| {
            if e.is_timeout() {
                FeedError::Timeout(self.timeout)
            } else {
                FeedError::Connection(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::Status(status.as_u16()));
        }

        response.json::<Value>().map_err(|e| {
            if e.is_timeout() {
                FeedError::Timeout(self.timeout)
            } else {
                FeedError::Parse(format!("body is not valid JSON: {e}"))
            }
        })
    }
}

impl SnapshotSource for HttpFeedClient {
    fn fetch_snapshot(&self) -> Result<GridSnapshot, FeedError> {
        info!(url = %self.url, "fetching grid feed");
        let payload = self.fetch_json()?;
        parse_feed_payload(&payload, Utc::now())
    }
}

/// Normalizes a feed body into a snapshot.
///
/// The `records` shape is preferred. The flat legacy shape (`peakLoad`,
/// `percent`) is only consulted when `records` is absent altogether.
pub fn parse_feed_payload(
    payload: &Value,
    observed_at: DateTime<Utc>,
) -> Result<GridSnapshot, FeedError> {
    let fields = payload
        .as_object()
        .ok_or_else(|| FeedError::Parse("feed body is not a JSON object".to_string()))?;

    let (load, rate) = if let Some(records) = fields.get("records") {
        let record = records
            .as_array()
            .and_then(|records| records.first())
            .and_then(|record| record.as_object())
            .ok_or_else(|| FeedError::Parse("records is empty or not a list".to_string()))?;
        (
            required_number(record, "curr_load")?,
            required_number(record, "curr_util_rate")?,
        )
    } else if fields.contains_key("peakLoad") {
        debug!("feed returned legacy flat payload");
        (
            required_number(fields, "peakLoad")?,
            required_number(fields, "percent")?,
        )
    } else {
        return Err(FeedError::Parse(
            "payload has neither records nor peakLoad".to_string(),
        ));
    };

    GridSnapshot::new(load, rate, observed_at).map_err(|e| FeedError::Parse(e.to_string()))
}

fn required_number(fields: &serde_json::Map<String, Value>, key: &str) -> Result<f64, FeedError> {
    get_field_f64(fields, key)
        .ok_or_else(|| FeedError::Parse(format!("field {key} is missing or not numeric")))
}

fn get_field_f64(fields: &serde_json::Map<String, Value>, key: &str) -> Option<f64> {
    fields.get(key).and_then(|value| match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    })
}
