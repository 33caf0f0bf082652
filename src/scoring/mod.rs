pub mod attribution;
pub mod config;
pub mod engine;
pub mod normalize;
pub mod ranking;
pub mod validation;

pub use attribution::{attribute, select_reasons, Attribution, Reason, ReasonKind};
pub use config::{EnginePolicy, DEFAULT_TIE_EPSILON};
pub use engine::{weighted_score, Engine, ScoreMatrix, Shapes};
pub use normalize::{normalize, NormalizedTable, DEGENERATE_NORMALIZED};
pub use ranking::{rank, top_n, Ranked};
pub use validation::{validate_policy, validate_profile};
