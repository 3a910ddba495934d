use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One dated value inside a series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub date: NaiveDate,
    pub value: f64,
}

impl Observation {
    pub fn new(date: NaiveDate, value: f64) -> Self {
        Self { date, value }
    }
}

/// Flat input row as it appears in the source table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueRow {
    pub date: NaiveDate,
    pub product: String,
    pub location: String,
    pub value: f64,
}
