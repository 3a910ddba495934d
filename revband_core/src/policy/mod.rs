pub mod bollinger;
pub mod control_policy;
pub mod zscore;
