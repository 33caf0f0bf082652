use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::indicators::IndicatorDataset;
use super::registry::{AliasStatus, NameIndex};
use super::sources::{Registry, WeightRow};
use super::types::{IndicatorId, SectorId};
use crate::error::{EngineError, EngineResult};

/// What to do when a sector declares no weight for an indicator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingWeightPolicy {
    /// Treat the weight as 0 and log a warning.
    #[default]
    Zero,
    /// Fail the load.
    Reject,
}

/// Per-sector weight vectors over the dataset's indicators.
///
/// Weights are non-negative and are not required to sum to any particular total;
/// scoring divides by each sector's own weight sum.
#[derive(Debug, Clone)]
pub struct SectorWeightProfile {
    sectors: NameIndex,
    width: usize,
    weights: Vec<f64>,
    row_count: usize,
}

impl SectorWeightProfile {
    pub fn load(
        rows: &[WeightRow],
        dataset: &IndicatorDataset,
        registry: &Registry,
        missing: MissingWeightPolicy,
    ) -> EngineResult<Self> {
        let mut sectors = NameIndex::new(registry.sectors.clone()).map_err(|dup| {
            EngineError::data_load(format!("registry lists sector '{}' more than once", dup))
        })?;
        if sectors.is_empty() {
            return Err(EngineError::data_load("registry lists no sectors"));
        }
        for (alias, canonical) in &registry.aliases {
            match sectors.add_alias(alias, canonical) {
                AliasStatus::Added | AliasStatus::Redundant => {}
                AliasStatus::Conflict(existing) => {
                    return Err(EngineError::data_load(format!(
                        "alias '{}' for '{}' collides with sector '{}'",
                        alias,
                        canonical,
                        sectors.name(existing)
                    )))
                }
                AliasStatus::UnknownTarget if dataset.province_id(canonical).is_none() => {
                    return Err(EngineError::data_load(format!(
                        "alias '{}' targets '{}', which is neither a registered province nor a registered sector",
                        alias, canonical
                    )))
                }
                // Province alias, already registered by the dataset
                AliasStatus::UnknownTarget => {}
            }
        }

        let width = dataset.indicator_count();
        let mut declared: Vec<Option<f64>> = vec![None; sectors.len() * width];

        for row in rows {
            let s = sectors.resolve(&row.sector).ok_or_else(|| {
                EngineError::data_load(format!(
                    "weight row references sector '{}', which is not registered",
                    row.sector
                ))
            })?;
            let IndicatorId(i) = dataset.indicator_id(&row.indicator).ok_or_else(|| {
                EngineError::data_load(format!(
                    "sector '{}' declares a weight for unknown indicator '{}'",
                    sectors.name(s),
                    row.indicator
                ))
            })?;
            if !row.weight.is_finite() || row.weight < 0.0 {
                return Err(EngineError::configuration(format!(
                    "sector '{}' has invalid weight {} for '{}' (weights must be finite and non-negative)",
                    sectors.name(s),
                    row.weight,
                    row.indicator
                )));
            }
            let cell = &mut declared[s * width + i];
            if cell.is_some() {
                return Err(EngineError::data_load(format!(
                    "sector '{}' declares a weight for '{}' more than once",
                    sectors.name(s),
                    row.indicator
                )));
            }
            *cell = Some(row.weight);
        }

        let mut weights = Vec::with_capacity(declared.len());
        let mut defaulted: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
        for (cell_idx, cell) in declared.iter().enumerate() {
            match cell {
                Some(w) => weights.push(*w),
                None => {
                    let sector = sectors.name(cell_idx / width);
                    let indicator = dataset.indicator(IndicatorId(cell_idx % width)).id.as_str();
                    if missing == MissingWeightPolicy::Reject {
                        return Err(EngineError::data_load(format!(
                            "sector '{}' declares no weight for '{}'",
                            sector, indicator
                        )));
                    }
                    defaulted.entry(sector).or_default().push(indicator);
                    weights.push(0.0);
                }
            }
        }

        for (sector, indicators) in &defaulted {
            tracing::warn!(
                sector = %sector,
                indicators = %indicators.join(", "),
                "no weight declared; defaulting to 0"
            );
        }

        Ok(Self {
            sectors,
            width,
            weights,
            row_count: rows.len(),
        })
    }

    pub fn weight(&self, sector: SectorId, indicator: IndicatorId) -> f64 {
        self.weights[sector.0 * self.width + indicator.0]
    }

    /// The sector's full weight vector, in indicator order.
    pub fn weights(&self, sector: SectorId) -> &[f64] {
        &self.weights[sector.0 * self.width..(sector.0 + 1) * self.width]
    }

    pub fn total_weight(&self, sector: SectorId) -> f64 {
        self.weights(sector).iter().sum()
    }

    pub fn sector_id(&self, name: &str) -> Option<SectorId> {
        self.sectors.resolve(name).map(SectorId)
    }

    pub fn sector_name(&self, sector: SectorId) -> &str {
        self.sectors.name(sector.0)
    }

    pub fn sector_names(&self) -> &[String] {
        self.sectors.names()
    }

    pub fn sector_count(&self) -> usize {
        self.sectors.len()
    }

    /// Number of weight rows the profile was loaded from.
    pub fn row_count(&self) -> usize {
        self.row_count
    }
}
