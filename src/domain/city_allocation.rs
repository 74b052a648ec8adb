use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RatioTableError {
    #[error("ratio table is empty")]
    Empty,
    #[error("ratio for {city} must be within (0, 1), got {ratio}")]
    RatioOutOfRange { city: String, ratio: f64 },
    #[error("city {0} appears more than once")]
    DuplicateCity(String),
    #[error("city name must not be blank")]
    BlankCity,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CityAllocation {
    pub city_name: String,
    pub peak_load_mw: f64,
    pub reserve_capacity_mw: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityRatio {
    pub city: String,
    pub ratio: f64,
}

/// Ordered city weights. Iteration order is the reporting order.
///
/// Ratios are independent weights and are not required to sum to one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<CityRatio>", into = "Vec<CityRatio>")]
pub struct RatioTable {
    entries: Vec<CityRatio>,
}

impl RatioTable {
    pub fn new(entries: Vec<CityRatio>) -> Result<Self, RatioTableError> {
        if entries.is_empty() {
            return Err(RatioTableError::Empty);
        }
        for (index, entry) in entries.iter().enumerate() {
            if entry.city.trim().is_empty() {
                return Err(RatioTableError::BlankCity);
            }
            if !(entry.ratio > 0.0 && entry.ratio < 1.0) {
                return Err(RatioTableError::RatioOutOfRange {
                    city: entry.city.clone(),
                    ratio: entry.ratio,
                });
            }
            if entries[..index].iter().any(|other| other.city == entry.city) {
                return Err(RatioTableError::DuplicateCity(entry.city.clone()));
            }
        }
        Ok(Self { entries })
    }

    pub fn from_pairs(pairs: &[(&str, f64)]) -> Result<Self, RatioTableError> {
        Self::new(
            pairs
                .iter()
                .map(|(city, ratio)| CityRatio {
                    city: (*city).to_string(),
                    ratio: *ratio,
                })
                .collect(),
        )
    }

    /// The six special municipalities with the weights the dashboard has always used.
    pub fn six_municipalities() -> Self {
        Self {
            entries: vec![
                city_ratio("台北市", 0.18),
                city_ratio("新北市", 0.22),
                city_ratio("桃園市", 0.15),
                city_ratio("台中市", 0.20),
                city_ratio("台南市", 0.12),
                city_ratio("高雄市", 0.13),
            ],
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &CityRatio> {
        self.entries.iter()
    }

    pub fn contains(&self, city: &str) -> bool {
        self.entries.iter().any(|entry| entry.city == city)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

impl Default for RatioTable {
    fn default() -> Self {
        Self::six_municipalities()
    }
}

impl TryFrom<Vec<CityRatio>> for RatioTable {
    type Error = RatioTableError;

    fn try_from(entries: Vec<CityRatio>) -> Result<Self, Self::Error> {
        Self::new(entries)
    }
}

impl From<RatioTable> for Vec<CityRatio> {
    fn from(table: RatioTable) -> Self {
        table.entries
    }
}

fn city_ratio(city: &str, ratio: f64) -> CityRatio {
    CityRatio {
        city: city.to_string(),
        ratio,
    }
}
