use std::fmt;
use std::ops::Index;

use serde::{Deserialize, Serialize};

use super::observation::Observation;
use crate::common::errors::RevisionError;

/// Identifies one independent series in the flat table.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SeriesKey {
    pub product: String,
    pub location: String,
}

impl SeriesKey {
    pub fn new(product: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            product: product.into(),
            location: location.into(),
        }
    }
}

impl fmt::Display for SeriesKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}", self.product, self.location)
    }
}

/// Ordered observations for one (product, location) key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    pub key: SeriesKey,
    pub lst: Vec<Observation>,
}

impl Series {
    pub fn new(key: SeriesKey) -> Self {
        Self {
            key,
            lst: Vec::new(),
        }
    }

    /// Append one observation, enforcing strictly increasing dates.
    pub fn add(&mut self, obs: Observation) -> Result<(), RevisionError> {
        if let Some(prev) = self.lst.last() {
            if obs.date <= prev.date {
                return Err(RevisionError::OutOfOrder {
                    key: self.key.to_string(),
                    row: self.lst.len(),
                });
            }
        }
        self.lst.push(obs);
        Ok(())
    }

    /// Build a series from observations already in date order.
    pub fn from_observations(
        key: SeriesKey,
        observations: Vec<Observation>,
    ) -> Result<Self, RevisionError> {
        let mut series = Self::new(key);
        for obs in observations {
            series.add(obs)?;
        }
        Ok(series)
    }

    pub fn len(&self) -> usize {
        self.lst.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lst.is_empty()
    }

    /// Get last observation
    pub fn last(&self) -> Option<&Observation> {
        self.lst.last()
    }

    /// Values only, in order.
    pub fn values(&self) -> Vec<f64> {
        self.lst.iter().map(|o| o.value).collect()
    }
}

impl Index<usize> for Series {
    type Output = Observation;

    fn index(&self, index: usize) -> &Self::Output {
        &self.lst[index]
    }
}
