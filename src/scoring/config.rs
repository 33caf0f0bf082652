use serde::{Deserialize, Serialize};

use crate::dataset::MissingWeightPolicy;

/// Default epsilon under which two scores are considered tied.
pub const DEFAULT_TIE_EPSILON: f64 = 1e-9;

/// Policy points of the engine.
///
/// Example YAML:
/// ```yaml
/// policy:
///   tie_epsilon: 1.0e-9
///   missing_weight: zero
/// ```
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct EnginePolicy {
    /// Scores closer than this are ordered by name instead (default: 1e-9)
    #[serde(default = "default_tie_epsilon")]
    pub tie_epsilon: f64,

    /// `zero` defaults undeclared weights to 0 with a warning, `reject` fails the load
    #[serde(default)]
    pub missing_weight: MissingWeightPolicy,
}

fn default_tie_epsilon() -> f64 {
    DEFAULT_TIE_EPSILON
}

impl Default for EnginePolicy {
    fn default() -> Self {
        Self {
            tie_epsilon: DEFAULT_TIE_EPSILON,
            missing_weight: MissingWeightPolicy::Zero,
        }
    }
}
