use serde::{Deserialize, Serialize};

/// Index of a province inside a loaded dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ProvinceId(pub usize);

/// Index of an indicator inside a loaded dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct IndicatorId(pub usize);

/// Index of a sector inside a loaded weight profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SectorId(pub usize);

/// Which end of an indicator's range is favorable.
///
/// Source sheets spell these `YUKSEK` (high is good) and `DUSUK` (low is good);
/// both spellings are accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[serde(alias = "YUKSEK", alias = "yuksek", alias = "Benefit", alias = "high")]
    Benefit,
    #[serde(alias = "DUSUK", alias = "dusuk", alias = "Cost", alias = "low")]
    Cost,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Benefit => "benefit",
            Direction::Cost => "cost",
        }
    }
}

/// An indicator with its data-driven range.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Indicator {
    pub id: String,
    /// Display label from the direction source, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub direction: Direction,
    /// Observed minimum over all loaded provinces
    pub min: f64,
    /// Observed maximum over all loaded provinces
    pub max: f64,
}

impl Indicator {
    /// True when every province has the same raw value.
    pub fn is_constant(&self) -> bool {
        self.max - self.min <= 0.0
    }
}
