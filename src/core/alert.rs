//! Spike alert record

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::option::OptionContract;

/// An IV move between two consecutive observations of one contract that
/// crossed the detector threshold. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpikeAlert {
    pub contract: OptionContract,
    /// IV (percent) on the previous observation
    pub old_iv: f64,
    /// IV (percent) on the current observation
    pub new_iv: f64,
    /// (new_iv - old_iv) / old_iv * 100
    pub change_percent: f64,
    pub timestamp: DateTime<Utc>,
}

impl SpikeAlert {
    pub fn new(
        contract: OptionContract,
        old_iv: f64,
        new_iv: f64,
        timestamp: DateTime<Utc>,
    ) -> Self {
        let change_percent = (new_iv - old_iv) / old_iv * 100.0;
        Self {
            contract,
            old_iv,
            new_iv,
            change_percent,
            timestamp,
        }
    }

    pub fn is_upward(&self) -> bool {
        self.change_percent > 0.0
    }
}

impl fmt::Display for SpikeAlert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let direction = if self.is_upward() { "📈" } else { "📉" };
        write!(
            f,
            "{} {}: IV {:.1}% → {:.1}% ({:+.1}%)",
            direction, self.contract, self.old_iv, self.new_iv, self.change_percent
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::OptionType;
    use chrono::NaiveDate;

    fn contract() -> OptionContract {
        OptionContract::new(
            "NIFTY",
            20000,
            NaiveDate::from_ymd_opt(2025, 6, 12).unwrap(),
            OptionType::Call,
        )
    }

    #[test]
    fn test_change_percent() {
        let up = SpikeAlert::new(contract(), 20.0, 24.0, Utc::now());
        assert!((up.change_percent - 20.0).abs() < 1e-9);
        assert!(up.is_upward());

        let down = SpikeAlert::new(contract(), 20.0, 17.0, Utc::now());
        assert!((down.change_percent + 15.0).abs() < 1e-9);
        assert!(!down.is_upward());
    }

    #[test]
    fn test_display() {
        let alert = SpikeAlert::new(contract(), 20.0, 24.0, Utc::now());
        assert_eq!(
            alert.to_string(),
            "📈 NIFTY 20000CE (Exp: 2025-06-12): IV 20.0% → 24.0% (+20.0%)"
        );
    }
}
