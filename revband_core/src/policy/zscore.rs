use chrono::NaiveDate;
use log::debug;

use super::control_policy::{BreachResult, ControlFrame, ControlPolicy, TrimResult};
use crate::common::enums::{PolicyKind, TrimStatus};
use crate::common::errors::RevisionError;
use crate::config::revision_config::RevisionConfig;
use crate::math::rolling::RollingWindow;
use crate::series::observation::Observation;
use crate::series::series::{Series, SeriesKey};

/// One position of a z-score frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZScoreRecord {
    pub date: NaiveDate,
    pub value: f64,
    pub mean: f64,
    pub std_dev: f64,
    /// NaN when the window had zero variance; every threshold comparison
    /// then reads false
    pub z_score: f64,
}

/// Z-score columns for one series, defined from the first full window onward.
#[derive(Debug, Clone)]
pub struct ZScoreFrame {
    pub key: SeriesKey,
    pub lst: Vec<ZScoreRecord>,
}

impl ControlFrame for ZScoreFrame {
    fn key(&self) -> &SeriesKey {
        &self.key
    }

    fn len(&self) -> usize {
        self.lst.len()
    }

    fn to_series(&self) -> Series {
        Series {
            key: self.key.clone(),
            lst: self
                .lst
                .iter()
                .map(|r| Observation::new(r.date, r.value))
                .collect(),
        }
    }
}

/// Rolling z-score control; a series breaches when its latest score exceeds
/// the threshold, and the trimmer clamps out-of-control points among the
/// last `trim_lookback` positions.
#[derive(Debug, Clone)]
pub struct ZScorePolicy {
    config: RevisionConfig,
}

impl ZScorePolicy {
    pub fn new(config: RevisionConfig) -> Self {
        Self { config }
    }
}

impl ControlPolicy for ZScorePolicy {
    type Frame = ZScoreFrame;

    fn kind(&self) -> PolicyKind {
        PolicyKind::ZScore
    }

    fn compute_bounds(&self, series: &Series) -> Result<ZScoreFrame, RevisionError> {
        let window = self.config.window_size;
        if series.len() < window {
            return Err(RevisionError::InsufficientData {
                key: series.key.to_string(),
                len: series.len(),
                window,
            });
        }

        let mut rolling = RollingWindow::new(window);
        let mut lst = Vec::with_capacity(series.len() - window + 1);
        for obs in &series.lst {
            if let Some(stat) = rolling.add(obs.value) {
                let z_score = if stat.std_dev == 0.0 {
                    f64::NAN
                } else {
                    (obs.value - stat.mean) / stat.std_dev
                };
                lst.push(ZScoreRecord {
                    date: obs.date,
                    value: obs.value,
                    mean: stat.mean,
                    std_dev: stat.std_dev,
                    z_score,
                });
            }
        }
        Ok(ZScoreFrame {
            key: series.key.clone(),
            lst,
        })
    }

    fn is_breached(&self, frame: &ZScoreFrame) -> BreachResult {
        let threshold = self.config.z_threshold;
        let (breached, margin) = match frame.lst.last() {
            Some(last) => (
                last.z_score > threshold,
                last.value - (last.mean + threshold * last.std_dev),
            ),
            None => (false, 0.0),
        };
        BreachResult {
            key: frame.key.clone(),
            breached,
            margin,
        }
    }

    fn trim(&self, frame: &ZScoreFrame) -> Result<TrimResult<ZScoreFrame>, RevisionError> {
        let original = frame.clone();
        let mut corrected = frame.clone();
        let threshold = self.config.z_threshold;
        let lookback = self.config.trim_lookback.min(corrected.lst.len());
        let start = corrected.lst.len() - lookback;

        // Every record keeps the statistics computed before any value moved,
        // so one clamp can never feed the next.
        let mut touched = 0usize;
        for record in &mut corrected.lst[start..] {
            if record.z_score > threshold {
                record.value = record.mean + threshold * record.std_dev;
                touched += 1;
            } else if record.z_score < -threshold {
                record.value = record.mean - threshold * record.std_dev;
                touched += 1;
            }
        }
        if touched > 0 {
            debug!(
                "clamped {} of the last {} points for {}",
                touched, lookback, frame.key
            );
        }

        let status = if touched > 0 {
            TrimStatus::Trimmed
        } else {
            TrimStatus::NotNeeded
        };
        let last_point_delta = match (original.lst.last(), corrected.lst.last()) {
            (Some(o), Some(c)) => o.value - c.value,
            _ => 0.0,
        };
        Ok(TrimResult {
            corrected,
            original,
            status,
            last_point_delta,
        })
    }
}
