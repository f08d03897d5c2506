//! Configuration for spike detection

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::core::{SpikeError, SpikeResult};

/// Configuration for the spike detector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpikeConfig {
    /// |change_percent| >= threshold marks a spike
    /// Default: 10.0
    pub threshold_percent: f64,

    /// Number of most recent alerts kept for queries
    /// Default: 100
    pub history_capacity: usize,

    /// Optional near-the-money pre-filter
    pub delta_filter: DeltaFilterConfig,
}

impl Default for SpikeConfig {
    fn default() -> Self {
        Self {
            threshold_percent: 10.0,
            history_capacity: 100,
            delta_filter: DeltaFilterConfig::default(),
        }
    }
}

impl SpikeConfig {
    pub fn with_threshold(threshold_percent: f64) -> Self {
        Self {
            threshold_percent,
            ..Default::default()
        }
    }

    /// Aggressive settings: lower threshold, more alerts
    pub fn aggressive() -> Self {
        Self::with_threshold(5.0)
    }

    /// Conservative settings: higher threshold, fewer alerts
    pub fn conservative() -> Self {
        Self::with_threshold(20.0)
    }

    pub fn validate(&self) -> SpikeResult<()> {
        if self.threshold_percent.is_nan() || self.threshold_percent <= 0.0 {
            return Err(SpikeError::config("threshold_percent must be positive"));
        }
        self.delta_filter.validate()
    }
}

/// Where the volatility fed into the delta computation comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VolatilitySource {
    /// The IV carried on the quote
    #[default]
    QuotedIv,
    /// Solve IV from the quote's last traded price
    ImpliedFromPrice,
}

/// Near-the-money admission filter configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeltaFilterConfig {
    /// Default: false
    pub enabled: bool,

    /// Admit contracts with min_abs_delta <= |delta| <= max_abs_delta
    /// Default: 0.38 / 0.42
    pub min_abs_delta: f64,
    pub max_abs_delta: f64,

    /// Continuously compounded risk-free rate
    /// Default: 0.06
    pub risk_free_rate: f64,

    pub volatility_source: VolatilitySource,

    /// Spot price per symbol. Symbols without a spot skip the filter.
    pub spots: HashMap<String, f64>,
}

impl Default for DeltaFilterConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            min_abs_delta: 0.38,
            max_abs_delta: 0.42,
            risk_free_rate: 0.06,
            volatility_source: VolatilitySource::QuotedIv,
            spots: HashMap::new(),
        }
    }
}

impl DeltaFilterConfig {
    pub fn validate(&self) -> SpikeResult<()> {
        if !(0.0..=1.0).contains(&self.min_abs_delta)
            || !(0.0..=1.0).contains(&self.max_abs_delta)
            || self.min_abs_delta > self.max_abs_delta
        {
            return Err(SpikeError::config(
                "delta band must satisfy 0 <= min <= max <= 1",
            ));
        }
        if let Some((symbol, _)) = self.spots.iter().find(|(_, &s)| s.is_nan() || s <= 0.0) {
            return Err(SpikeError::config(format!("spot for {} must be positive", symbol)));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SpikeConfig::default();
        assert_eq!(config.threshold_percent, 10.0);
        assert!(!config.delta_filter.enabled);
        assert!(config.validate().is_ok());
        assert!(
            SpikeConfig::aggressive().threshold_percent
                < SpikeConfig::conservative().threshold_percent
        );
    }

    #[test]
    fn test_validate() {
        assert!(SpikeConfig::with_threshold(0.0).validate().is_err());

        let mut config = SpikeConfig::default();
        config.delta_filter.min_abs_delta = 0.5;
        config.delta_filter.max_abs_delta = 0.4;
        assert!(config.validate().is_err());

        let mut config = SpikeConfig::default();
        config.delta_filter.spots.insert("NIFTY".into(), -1.0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_volatility_source_serde() {
        let parsed: DeltaFilterConfig =
            toml::from_str("volatility_source = \"implied_from_price\"").unwrap();
        assert_eq!(parsed.volatility_source, VolatilitySource::ImpliedFromPrice);
        assert_eq!(parsed.min_abs_delta, 0.38);
    }
}
