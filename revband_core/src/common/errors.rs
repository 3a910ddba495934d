use thiserror::Error;

/// Errors raised by the revision pipeline.
///
/// `InsufficientData` is recoverable per series (the aggregator logs and
/// skips); everything else is structural and aborts the pass.
#[derive(Debug, Error)]
pub enum RevisionError {
    /// Input table is missing or misnaming a required column.
    #[error("schema error: {0}")]
    Schema(String),

    /// Series has fewer observations than the rolling window needs.
    #[error("insufficient data for {key}: {len} observations, window {window}")]
    InsufficientData {
        key: String,
        len: usize,
        window: usize,
    },

    /// A zero denominator where the trim would produce an infinite scale.
    #[error("division by zero: {0}")]
    DivisionByZero(String),

    /// Two series that should align point for point do not.
    #[error("shape mismatch: {0}")]
    ShapeMismatch(String),

    /// Configuration or policy-name value outside the accepted range.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Dates within one series are not strictly increasing.
    #[error("out-of-order date for {key} at row {row}")]
    OutOfOrder { key: String, row: usize },
}

impl RevisionError {
    /// True for the per-series condition the aggregator may skip over.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, RevisionError::InsufficientData { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = RevisionError::InsufficientData {
            key: "Product A at Location 1".to_string(),
            len: 5,
            window: 10,
        };
        assert_eq!(
            err.to_string(),
            "insufficient data for Product A at Location 1: 5 observations, window 10"
        );
        assert!(err.is_recoverable());

        let err = RevisionError::Schema("missing column 'value'".to_string());
        assert_eq!(err.to_string(), "schema error: missing column 'value'");
        assert!(!err.is_recoverable());
    }
}
