pub mod analyzer;
pub mod common;
pub mod config;
pub mod math;
pub mod policy;
pub mod series;

pub use analyzer::aggregator::{RevisionAggregator, RevisionRecord};
pub use common::enums::PolicyKind;
pub use common::errors::RevisionError;
pub use config::revision_config::RevisionConfig;
pub use series::series::{Series, SeriesKey};
