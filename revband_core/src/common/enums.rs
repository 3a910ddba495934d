use strum_macros::{Display, EnumString};

/// Which control-band policy drives a pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
pub enum PolicyKind {
    #[strum(serialize = "bollinger")]
    Bollinger,
    #[strum(serialize = "zscore")]
    ZScore,
}

/// Outcome of running the trimmer over one series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
pub enum TrimStatus {
    #[strum(serialize = "trimmed")]
    Trimmed,
    #[strum(serialize = "no trim needed")]
    NotNeeded,
}

impl TrimStatus {
    /// Status line for reports.
    pub fn message(&self) -> &'static str {
        match self {
            TrimStatus::Trimmed => "Data points have been trimmed back inside the control limits.",
            TrimStatus::NotNeeded => {
                "The latest data point has not breached the control limit, no trimming needed."
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_policy_kind_round_trip() {
        assert_eq!(PolicyKind::Bollinger.to_string(), "bollinger");
        assert_eq!(PolicyKind::from_str("zscore").unwrap(), PolicyKind::ZScore);
        assert!(PolicyKind::from_str("ewma").is_err());
    }

    #[test]
    fn test_trim_status_display() {
        assert_eq!(TrimStatus::Trimmed.to_string(), "trimmed");
        assert_eq!(TrimStatus::NotNeeded.to_string(), "no trim needed");
        assert!(TrimStatus::Trimmed.message().contains("trimmed"));
    }
}
