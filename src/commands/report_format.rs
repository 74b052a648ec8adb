use crate::domain::city_allocation::CityAllocation;
use crate::domain::forecast::CityForecast;
use crate::domain::history::HistorySource;
use crate::services::refresh_pipeline::DashboardReport;
use crate::services::snapshot_table::SnapshotTable;

pub fn format_snapshot_table(table: &SnapshotTable) -> String {
    let mut lines = Vec::new();
    lines.push("National Grid Snapshot".to_string());
    lines.push("Key | Value".to_string());
    lines.push("----|------".to_string());
    for row in &table.rows {
        lines.push(format!("{} | {}", row.key, row.value));
    }
    lines.join("\n")
}

pub fn format_allocation_table(allocations: &[CityAllocation]) -> String {
    let mut lines = Vec::new();
    lines.push("City Allocation".to_string());
    lines.push("城市 | 尖峰負載(MW) | 模擬備轉容量(MW)".to_string());
    lines.push("-----|--------------|------------------".to_string());
    for allocation in allocations {
        lines.push(format!(
            "{} | {:.2} | {:.2}",
            allocation.city_name, allocation.peak_load_mw, allocation.reserve_capacity_mw
        ));
    }
    lines.join("\n")
}

pub fn format_city_forecast(forecast: &CityForecast) -> String {
    let source = match forecast.history_source {
        HistorySource::Synthetic => "synthetic history",
        HistorySource::Observed => "observed history",
    };
    let mut lines = Vec::new();
    lines.push(format!(
        "Forecast: {} ({source}, base {:.2} MW)",
        forecast.city, forecast.base_value
    ));
    if let Some(error) = &forecast.error {
        lines.push(format!("Forecast failed: {error}"));
        return lines.join("\n");
    }
    lines.push("Time | Estimate | Lower | Upper".to_string());
    lines.push("-----|----------|-------|------".to_string());
    for point in &forecast.points {
        lines.push(format!(
            "{} | {:.2} | {:.2} | {:.2}",
            point.timestamp.format("%Y-%m-%d %H:%M"),
            point.point_estimate,
            point.lower_bound,
            point.upper_bound
        ));
    }
    lines.join("\n")
}

pub fn format_dashboard_report(report: &DashboardReport) -> String {
    let mut sections = vec![
        format_snapshot_table(&report.snapshot),
        format_allocation_table(&report.allocations),
    ];
    sections.extend(report.forecasts.iter().map(format_city_forecast));
    sections.join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::forecast::ForecastPoint;
    use crate::services::snapshot_table::SnapshotTable;
    use crate::test_support::{snapshot_at_noon, taipei_offset};
    use chrono::NaiveDate;

    fn build_forecast(error: Option<&str>) -> CityForecast {
        CityForecast {
            city: "台北市".to_string(),
            history_source: HistorySource::Synthetic,
            base_value: 5400.0,
            points: vec![ForecastPoint {
                timestamp: NaiveDate::from_ymd_opt(2026, 10, 17)
                    .unwrap()
                    .and_hms_opt(13, 0, 0)
                    .unwrap(),
                point_estimate: 5401.256,
                lower_bound: 5300.0,
                upper_bound: 5502.5,
            }],
            error: error.map(str::to_string),
        }
    }

    #[test]
    fn format_snapshot_table_lists_rows() {
        let table = SnapshotTable::from_snapshot(&snapshot_at_noon(30_000.0, 10.0), taipei_offset());
        let output = format_snapshot_table(&table);
        assert!(output.contains("National Grid Snapshot"));
        assert!(output.contains("目前尖峰負載(MW) | 30000.0"));
        assert!(output.contains("目前備轉容量(MW) | 3000.0"));
        assert!(output.contains("備轉率(%) | 10.0"));
        assert!(output.contains("更新時間 | 2026-10-17 12:00:00"));
    }

    #[test]
    fn format_allocation_table_uses_two_decimals() {
        let output = format_allocation_table(&[CityAllocation {
            city_name: "CityA".to_string(),
            peak_load_mw: 5400.0,
            reserve_capacity_mw: 540.0,
        }]);
        assert!(output.contains("城市 | 尖峰負載(MW) | 模擬備轉容量(MW)"));
        assert!(output.contains("CityA | 5400.00 | 540.00"));
    }

    #[test]
    fn format_city_forecast_includes_source_and_rows() {
        let output = format_city_forecast(&build_forecast(None));
        assert!(output.contains("Forecast: 台北市 (synthetic history, base 5400.00 MW)"));
        assert!(output.contains("2026-10-17 13:00 | 5401.26 | 5300.00 | 5502.50"));
    }

    #[test]
    fn format_city_forecast_reports_failure_instead_of_rows() {
        let output = format_city_forecast(&build_forecast(Some("history is degenerate")));
        assert!(output.contains("Forecast failed: history is degenerate"));
        assert!(!output.contains("Time | Estimate"));
    }
}
