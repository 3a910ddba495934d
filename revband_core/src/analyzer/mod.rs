pub mod aggregator;
pub mod diff;
