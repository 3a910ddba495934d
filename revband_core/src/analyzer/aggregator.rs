use std::collections::BTreeMap;

use log::{debug, info};
use rayon::prelude::*;

use crate::common::enums::TrimStatus;
use crate::common::errors::RevisionError;
use crate::policy::control_policy::{ControlFrame, ControlPolicy, TrimResult};
use crate::series::series::{Series, SeriesKey};

/// One series flagged for revision, with its before and after values.
#[derive(Debug, Clone)]
pub struct RevisionRecord {
    pub key: SeriesKey,
    /// Original minus corrected value at the latest point
    pub last_point_delta: f64,
    pub status: TrimStatus,
    pub original: Series,
    pub corrected: Series,
}

/// Runs detection and trimming across every series of a partition and ranks
/// the flagged ones by correction size.
pub struct RevisionAggregator<P> {
    policy: P,
}

impl<P: ControlPolicy + Sync> RevisionAggregator<P> {
    pub fn new(policy: P) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &P {
        &self.policy
    }

    /// Keys whose latest point breaches, in key order.
    pub fn series_needing_revision(
        &self,
        series_map: &BTreeMap<SeriesKey, Series>,
    ) -> Result<Vec<SeriesKey>, RevisionError> {
        let mut flagged = Vec::new();
        for (key, series) in series_map {
            match self.policy.compute_bounds(series) {
                Ok(frame) => {
                    if self.policy.is_breached(&frame).breached {
                        flagged.push(key.clone());
                    }
                }
                Err(err) if err.is_recoverable() => {
                    debug!("skipping {}: {}", key, err);
                }
                Err(err) => return Err(err),
            }
        }
        Ok(flagged)
    }

    /// Full pass: flag, trim, and rank every breaching series.
    ///
    /// Series are independent, so the per-series work runs in parallel; the
    /// final ordering is the only join point. An empty result is a valid
    /// outcome, not an error.
    pub fn run(
        &self,
        series_map: &BTreeMap<SeriesKey, Series>,
    ) -> Result<Vec<RevisionRecord>, RevisionError> {
        let entries: Vec<(&SeriesKey, &Series)> = series_map.iter().collect();
        let results: Vec<Result<Option<RevisionRecord>, RevisionError>> = entries
            .into_par_iter()
            .map(|(key, series)| self.process_one(key, series))
            .collect();

        let mut records = Vec::new();
        for result in results {
            if let Some(record) = result? {
                records.push(record);
            }
        }
        // Largest downward correction first
        records.sort_by(|a, b| b.last_point_delta.total_cmp(&a.last_point_delta));
        info!(
            "{} of {} series flagged for revision",
            records.len(),
            series_map.len()
        );
        Ok(records)
    }

    fn process_one(
        &self,
        key: &SeriesKey,
        series: &Series,
    ) -> Result<Option<RevisionRecord>, RevisionError> {
        let frame = match self.policy.compute_bounds(series) {
            Ok(frame) => frame,
            Err(err) if err.is_recoverable() => {
                debug!("skipping {}: {}", key, err);
                return Ok(None);
            }
            Err(err) => return Err(err),
        };
        if !self.policy.is_breached(&frame).breached {
            return Ok(None);
        }

        let TrimResult {
            corrected,
            original,
            status,
            last_point_delta,
        } = self.policy.trim(&frame)?;
        debug!("{}: {}", key, status.message());
        Ok(Some(RevisionRecord {
            key: key.clone(),
            last_point_delta,
            status,
            original: original.to_series(),
            corrected: corrected.to_series(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::revision_config::RevisionConfig;
    use crate::policy::bollinger::BollingerPolicy;
    use crate::policy::zscore::ZScorePolicy;
    use crate::series::observation::Observation;
    use chrono::NaiveDate;

    fn make_series(product: &str, location: &str, values: &[f64]) -> (SeriesKey, Series) {
        let key = SeriesKey::new(product, location);
        let mut series = Series::new(key.clone());
        for (i, &value) in values.iter().enumerate() {
            let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
                + chrono::Duration::days(i as i64);
            series.add(Observation::new(date, value)).unwrap();
        }
        (key, series)
    }

    fn make_map(entries: Vec<(SeriesKey, Series)>) -> BTreeMap<SeriesKey, Series> {
        entries.into_iter().collect()
    }

    fn spike(tail: f64) -> Vec<f64> {
        let mut values = vec![5.0; 9];
        values.push(tail);
        values
    }

    #[test]
    fn test_run_ranks_by_delta_descending() {
        let map = make_map(vec![
            make_series("Product A", "Location 1", &spike(100.0)),
            make_series("Product B", "Location 1", &spike(500.0)),
            make_series("Product C", "Location 1", &[5.0; 10]),
        ]);
        let aggregator = RevisionAggregator::new(BollingerPolicy::new(RevisionConfig::default()));
        let records = aggregator.run(&map).unwrap();

        assert_eq!(records.len(), 2, "the flat series is never flagged");
        assert_eq!(records[0].key.product, "Product B");
        assert_eq!(records[1].key.product, "Product A");
        assert!(records[0].last_point_delta > records[1].last_point_delta);
        for record in &records {
            assert_eq!(record.status, TrimStatus::Trimmed);
            assert_eq!(record.original.len(), record.corrected.len());
        }
    }

    #[test]
    fn test_run_skips_short_series() {
        let map = make_map(vec![
            make_series("Product A", "Location 1", &spike(100.0)),
            make_series("Product B", "Location 2", &[5.0; 4]),
        ]);
        let aggregator = RevisionAggregator::new(BollingerPolicy::new(RevisionConfig::default()));
        let records = aggregator.run(&map).unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].key.product, "Product A");
    }

    #[test]
    fn test_run_empty_result_is_ok() {
        let map = make_map(vec![make_series("Product A", "Location 1", &[5.0; 10])]);
        let aggregator = RevisionAggregator::new(ZScorePolicy::new(RevisionConfig::default()));
        let records = aggregator.run(&map).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_series_needing_revision_in_key_order() {
        let map = make_map(vec![
            make_series("Product B", "Location 1", &spike(500.0)),
            make_series("Product A", "Location 1", &spike(100.0)),
            make_series("Product A", "Location 2", &[5.0; 3]),
        ]);
        let aggregator = RevisionAggregator::new(BollingerPolicy::new(RevisionConfig::default()));
        let flagged = aggregator.series_needing_revision(&map).unwrap();

        let names: Vec<String> = flagged.iter().map(|k| k.to_string()).collect();
        // Key order, not delta order; the short series is skipped
        assert_eq!(
            names,
            vec!["Product A at Location 1", "Product B at Location 1"]
        );
    }
}
