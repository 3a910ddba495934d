use crate::common::errors::RevisionError;

/// Parameters shared by every pass of the revision pipeline.
#[derive(Debug, Clone)]
pub struct RevisionConfig {
    /// Rolling window length, in observations
    pub window_size: usize,

    /// Band half-width in standard deviations (Bollinger policy)
    pub band_multiplier: f64,

    /// Z-score magnitude above which a point is out of control
    pub z_threshold: f64,

    /// How many trailing points the z-score trimmer may rewrite
    pub trim_lookback: usize,
}

impl Default for RevisionConfig {
    fn default() -> Self {
        Self {
            window_size: 10,
            band_multiplier: 1.0,
            z_threshold: 1.0,
            trim_lookback: 8,
        }
    }
}

impl RevisionConfig {
    /// Create a new RevisionConfig with custom parameters
    pub fn new(
        window_size: Option<usize>,
        band_multiplier: Option<f64>,
        z_threshold: Option<f64>,
        trim_lookback: Option<usize>,
    ) -> Result<Self, RevisionError> {
        let default = Self::default();
        let config = Self {
            window_size: window_size.unwrap_or(default.window_size),
            band_multiplier: band_multiplier.unwrap_or(default.band_multiplier),
            z_threshold: z_threshold.unwrap_or(default.z_threshold),
            trim_lookback: trim_lookback.unwrap_or(default.trim_lookback),
        };
        config.validate()?;
        Ok(config)
    }

    /// Check every field against its accepted range.
    pub fn validate(&self) -> Result<(), RevisionError> {
        if self.window_size < 2 {
            return Err(RevisionError::InvalidParameter(format!(
                "window_size must be at least 2, got {}",
                self.window_size
            )));
        }
        if self.trim_lookback < 1 {
            return Err(RevisionError::InvalidParameter(
                "trim_lookback must be at least 1".to_string(),
            ));
        }
        if !self.band_multiplier.is_finite() || self.band_multiplier <= 0.0 {
            return Err(RevisionError::InvalidParameter(format!(
                "band_multiplier must be finite and positive, got {}",
                self.band_multiplier
            )));
        }
        if !self.z_threshold.is_finite() || self.z_threshold <= 0.0 {
            return Err(RevisionError::InvalidParameter(format!(
                "z_threshold must be finite and positive, got {}",
                self.z_threshold
            )));
        }
        Ok(())
    }
}
