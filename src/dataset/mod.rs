pub mod indicators;
pub mod registry;
pub mod sources;
pub mod types;
pub mod weights;

pub use indicators::IndicatorDataset;
pub use registry::{lookup_key, AliasStatus, NameIndex};
pub use sources::{read_table, DirectionRow, ProvinceRow, Registry, SourcePaths, Sources, WeightRow};
pub use types::{Direction, Indicator, IndicatorId, ProvinceId, SectorId};
pub use weights::{MissingWeightPolicy, SectorWeightProfile};
