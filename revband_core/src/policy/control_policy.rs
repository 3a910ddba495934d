use crate::common::enums::{PolicyKind, TrimStatus};
use crate::common::errors::RevisionError;
use crate::series::series::{Series, SeriesKey};

/// Latest-point verdict for one series.
#[derive(Debug, Clone, PartialEq)]
pub struct BreachResult {
    pub key: SeriesKey,
    pub breached: bool,
    /// Latest value minus the boundary it was checked against
    pub margin: f64,
}

/// Correction outcome carrying the untouched input snapshot.
#[derive(Debug, Clone)]
pub struct TrimResult<F> {
    pub corrected: F,
    pub original: F,
    pub status: TrimStatus,
    /// Original minus corrected value at the latest point
    pub last_point_delta: f64,
}

/// Windowed statistic columns derived from one series.
pub trait ControlFrame {
    /// Get the series key
    fn key(&self) -> &SeriesKey;

    /// Number of positions with a defined statistic
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Collapse back to a plain dated series for audit and export.
    fn to_series(&self) -> Series;
}

/// One control-band policy: rolling bounds, breach test, corrective trim.
pub trait ControlPolicy {
    type Frame: ControlFrame;

    /// Which policy this is
    fn kind(&self) -> PolicyKind;

    /// Compute the windowed statistic columns for one series.
    fn compute_bounds(&self, series: &Series) -> Result<Self::Frame, RevisionError>;

    /// Check the latest point against the control boundary.
    fn is_breached(&self, frame: &Self::Frame) -> BreachResult;

    /// Correct the frame without touching its input; statistics stay as
    /// computed before any value moved.
    fn trim(&self, frame: &Self::Frame) -> Result<TrimResult<Self::Frame>, RevisionError>;
}
