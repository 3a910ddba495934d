use chrono::NaiveDate;
use log::debug;

use super::control_policy::{BreachResult, ControlFrame, ControlPolicy, TrimResult};
use crate::common::enums::{PolicyKind, TrimStatus};
use crate::common::errors::RevisionError;
use crate::config::revision_config::RevisionConfig;
use crate::math::rolling::RollingWindow;
use crate::series::observation::Observation;
use crate::series::series::{Series, SeriesKey};

/// One position of a Bollinger frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BollingerRecord {
    pub date: NaiveDate,
    pub value: f64,
    pub moving_avg: f64,
    pub std_dev: f64,
    pub upper_band: f64,
    pub lower_band: f64,
}

/// Band columns for one series, defined from the first full window onward.
#[derive(Debug, Clone)]
pub struct BollingerFrame {
    pub key: SeriesKey,
    pub lst: Vec<BollingerRecord>,
}

impl ControlFrame for BollingerFrame {
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

/// Moving average +/- k standard deviations; a series breaches when its
/// latest value closes above the upper band.
#[derive(Debug, Clone)]
pub struct BollingerPolicy {
    config: RevisionConfig,
}

impl BollingerPolicy {
    pub fn new(config: RevisionConfig) -> Self {
        Self { config }
    }
}

impl ControlPolicy for BollingerPolicy {
    type Frame = BollingerFrame;

    fn kind(&self) -> PolicyKind {
        PolicyKind::Bollinger
    }

    fn compute_bounds(&self, series: &Series) -> Result<BollingerFrame, RevisionError> {
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
                let spread = self.config.band_multiplier * stat.std_dev;
                lst.push(BollingerRecord {
                    date: obs.date,
                    value: obs.value,
                    moving_avg: stat.mean,
                    std_dev: stat.std_dev,
                    upper_band: stat.mean + spread,
                    lower_band: stat.mean - spread,
                });
            }
        }
        Ok(BollingerFrame {
            key: series.key.clone(),
            lst,
        })
    }

    fn is_breached(&self, frame: &BollingerFrame) -> BreachResult {
        let (breached, margin) = match frame.lst.last() {
            Some(last) => (last.value > last.upper_band, last.value - last.upper_band),
            None => (false, 0.0),
        };
        BreachResult {
            key: frame.key.clone(),
            breached,
            margin,
        }
    }

    fn trim(&self, frame: &BollingerFrame) -> Result<TrimResult<BollingerFrame>, RevisionError> {
        let original = frame.clone();
        if !self.is_breached(frame).breached {
            return Ok(TrimResult {
                corrected: original.clone(),
                original,
                status: TrimStatus::NotNeeded,
                last_point_delta: 0.0,
            });
        }

        // Breach confirmed, so lst is non-empty here
        let last = original.lst[original.lst.len() - 1];
        if last.value == 0.0 {
            return Err(RevisionError::DivisionByZero(format!(
                "latest value for {} is zero, cannot scale to the upper band",
                frame.key
            )));
        }

        // Scale the whole value column so the latest point lands exactly on
        // the upper band; band columns keep their pre-trim values.
        let scale = last.upper_band / last.value;
        debug!("trimming {} by factor {:.6}", frame.key, scale);
        let mut corrected = original.clone();
        for record in &mut corrected.lst {
            record.value *= scale;
        }

        let last_point_delta = last.value - corrected.lst[corrected.lst.len() - 1].value;
        Ok(TrimResult {
            corrected,
            original,
            status: TrimStatus::Trimmed,
            last_point_delta,
        })
    }
}
