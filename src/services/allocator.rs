use crate::domain::city_allocation::{CityAllocation, RatioTable};
use crate::domain::grid_snapshot::GridSnapshot;

/// Splits the national peak load across the cities of `ratios`, in table order.
///
/// Both figures are rounded to two decimals. Reserve capacity is derived from
/// the already-rounded city load, so the table a reader sees is internally
/// consistent.
pub fn allocate(snapshot: &GridSnapshot, ratios: &RatioTable) -> Vec<CityAllocation> {
    let national_load = snapshot.current_peak_load_mw();
    let utilization_rate = snapshot.utilization_rate_percent();

    ratios
        .iter()
        .map(|entry| {
            let peak_load_mw = round2(national_load * entry.ratio);
            CityAllocation {
                city_name: entry.city.clone(),
                peak_load_mw,
                reserve_capacity_mw: reserve_capacity(peak_load_mw, utilization_rate),
            }
        })
        .collect()
}

pub fn reserve_capacity(load_mw: f64, utilization_rate_percent: f64) -> f64 {
    round2(load_mw * utilization_rate_percent / 100.0)
}

/// Two-decimal rounding with exact halves going to the even neighbour
/// (`0.125` becomes `0.12`, `0.375` becomes `0.38`).
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}
