use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use super::types::Direction;
use crate::error::{EngineError, EngineResult};

/// One province row of the province × indicator table.
///
/// A `null` cell deserializes to `None` so the loader can report which value is missing.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ProvinceRow {
    pub province: String,
    pub values: BTreeMap<String, Option<f64>>,
}

/// Declared direction (and optional display label) for one indicator.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct DirectionRow {
    pub indicator: String,
    #[serde(default)]
    pub direction: Option<Direction>,
    #[serde(default)]
    pub label: Option<String>,
}

/// One long-format row of the sector × indicator weight sheet.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct WeightRow {
    pub sector: String,
    pub indicator: String,
    pub weight: f64,
}

/// Canonical province and sector names, plus alternative spellings.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Registry {
    pub provinces: Vec<String>,
    pub sectors: Vec<String>,
    /// alias -> canonical name (province or sector)
    #[serde(default)]
    pub aliases: BTreeMap<String, String>,
}

/// The four tabular inputs that feed initialization.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sources {
    pub values: Vec<ProvinceRow>,
    pub directions: Vec<DirectionRow>,
    pub weights: Vec<WeightRow>,
    pub registry: Registry,
}

/// File locations of the four sources.
#[derive(Debug, Clone, PartialEq)]
pub struct SourcePaths {
    pub values: PathBuf,
    pub directions: PathBuf,
    pub weights: PathBuf,
    pub registry: PathBuf,
}

impl Sources {
    /// Read all four sources from disk.
    pub fn read(paths: &SourcePaths) -> EngineResult<Self> {
        Ok(Self {
            values: read_table(&paths.values)?,
            directions: read_table(&paths.directions)?,
            weights: read_table(&paths.weights)?,
            registry: read_table(&paths.registry)?,
        })
    }
}

/// Read a JSON or YAML file into `T`, picking the parser from the extension.
pub fn read_table<T: DeserializeOwned>(path: &Path) -> EngineResult<T> {
    let content = fs::read_to_string(path).map_err(|e| {
        EngineError::data_load(format!("failed to read {}: {}", path.display(), e))
    })?;

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "json" => serde_json::from_str(&content).map_err(|e| {
            EngineError::data_load(format!("invalid JSON in {}: {}", path.display(), e))
        }),
        "yaml" | "yml" => serde_saphyr::from_str(&content).map_err(|e| {
            EngineError::data_load(format!("invalid YAML in {}: {}", path.display(), e))
        }),
        _ => Err(EngineError::data_load(format!(
            "unsupported source format for {} (expected .json, .yaml or .yml)",
            path.display()
        ))),
    }
}
