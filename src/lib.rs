//! Sector/province suitability scoring.
//!
//! Raw provincial indicators are min-max normalized to 0-100 with each indicator's
//! declared direction, combined per sector by a weighted mean, and served as two ranked
//! queries: best provinces for a sector, and best sectors for a province.

pub mod config;
pub mod dataset;
pub mod error;
pub mod output;
pub mod query;
pub mod scoring;
pub mod service;

pub use error::{EngineError, EngineResult};
pub use query::{Mode, Query, QueryResponse, ReasonOptions};
pub use scoring::{Engine, EnginePolicy};
pub use service::EngineHandle;
