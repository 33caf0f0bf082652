use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::scoring::EnginePolicy;

/// Top-level configuration file.
///
/// Example YAML:
/// ```yaml
/// data:
///   values: data/values.json
///   directions: data/directions.yaml
///   weights: data/weights.yaml
///   registry: data/registry.yaml
/// policy:
///   tie_epsilon: 1.0e-9
///   missing_weight: zero
/// output:
///   top: 5
///   reasons: 2
///   include_risk: true
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub data: DataConfig,

    #[serde(default)]
    pub policy: Option<EnginePolicy>,

    #[serde(default)]
    pub output: Option<OutputConfig>,
}

/// Locations of the four source tables. Relative paths resolve against the config file's
/// directory.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct DataConfig {
    /// Province × indicator raw values
    pub values: PathBuf,
    /// Indicator → direction (and optional label)
    pub directions: PathBuf,
    /// Sector × indicator weights
    pub weights: PathBuf,
    /// Province and sector name registry
    pub registry: PathBuf,
}

/// Presentation defaults for the CLI.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    /// Default top-N when `-n` is not given (default: 5)
    #[serde(default)]
    pub top: Option<usize>,

    /// Strength reasons per ranked item (default: 2)
    #[serde(default)]
    pub reasons: Option<usize>,

    /// Whether to list the weakest indicator as a risk (default: true)
    #[serde(default)]
    pub include_risk: Option<bool>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            top: Some(5),
            reasons: Some(2),
            include_risk: Some(true),
        }
    }
}
