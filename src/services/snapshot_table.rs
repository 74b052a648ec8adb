use chrono::FixedOffset;
use serde::Serialize;

use crate::domain::grid_snapshot::GridSnapshot;
use crate::services::allocator::reserve_capacity;

pub const PEAK_LOAD_KEY: &str = "目前尖峰負載(MW)";
pub const RESERVE_CAPACITY_KEY: &str = "目前備轉容量(MW)";
pub const RESERVE_RATE_KEY: &str = "備轉率(%)";
pub const UPDATED_AT_KEY: &str = "更新時間";

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct SnapshotRow {
    pub key: String,
    pub value: String,
}

/// National summary shown above the per-city table.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct SnapshotTable {
    pub rows: Vec<SnapshotRow>,
}

impl SnapshotTable {
    /// The update time is when the feed was actually fetched, so a cached
    /// snapshot keeps showing its original time. Rendered in `offset` as
    /// `YYYY-MM-DD HH:MM:SS`.
    pub fn from_snapshot(snapshot: &GridSnapshot, offset: FixedOffset) -> Self {
        let load = snapshot.current_peak_load_mw();
        let rate = snapshot.utilization_rate_percent();
        let rows = vec![
            row(PEAK_LOAD_KEY, format_number(load)),
            row(RESERVE_CAPACITY_KEY, format_number(reserve_capacity(load, rate))),
            row(RESERVE_RATE_KEY, format_number(rate)),
            row(
                UPDATED_AT_KEY,
                snapshot
                    .observed_at()
                    .with_timezone(&offset)
                    .format("%Y-%m-%d %H:%M:%S")
                    .to_string(),
            ),
        ];
        Self { rows }
    }

    pub fn value(&self, key: &str) -> Option<&str> {
        self.rows
            .iter()
            .find(|row| row.key == key)
            .map(|row| row.value.as_str())
    }
}

fn row(key: &str, value: String) -> SnapshotRow {
    SnapshotRow {
        key: key.to_string(),
        value,
    }
}

fn format_number(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.1}")
    } else {
        format!("{value}")
    }
}
