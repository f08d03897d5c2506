//! SpikeDetector - compares consecutive IV readings per contract
//!
//! For every quote of a cycle, the IV is compared with the value the feed
//! held for that contract before the cycle. A relative move of at least the
//! configured threshold (in either direction) produces a `SpikeAlert`.
//! The optional delta filter only narrows which contracts are evaluated.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::core::{QuoteUpdate, SpikeAlert};

use super::{Admission, AlertHistory, DeltaFilter, SpikeConfig};

/// Detector counters for the query surface
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DetectorStats {
    pub threshold_percent: f64,
    pub delta_filter_enabled: bool,
    pub cycles_evaluated: u64,
    pub quotes_evaluated: u64,
    pub first_observations: u64,
    pub filtered_out: u64,
    pub undeterminable: u64,
    pub spikes_detected: u64,
    pub alerts_retained: usize,
    pub last_spike_at: Option<DateTime<Utc>>,
}

pub struct SpikeDetector {
    config: SpikeConfig,
    filter: Option<DeltaFilter>,
    history: AlertHistory,
    stats: DetectorStats,
}

impl SpikeDetector {
    /// Create a new detector with default configuration
    pub fn new() -> Self {
        Self::with_config(SpikeConfig::default())
    }

    /// Create with custom configuration
    pub fn with_config(config: SpikeConfig) -> Self {
        Self {
            filter: DeltaFilter::from_config(&config.delta_filter),
            history: AlertHistory::new(config.history_capacity),
            stats: DetectorStats::default(),
            config,
        }
    }

    /// Get current configuration
    pub fn config(&self) -> &SpikeConfig {
        &self.config
    }

    /// Update configuration. Counters and retained alerts are kept.
    pub fn set_config(&mut self, config: SpikeConfig) {
        self.filter = DeltaFilter::from_config(&config.delta_filter);
        self.history.set_capacity(config.history_capacity);
        self.config = config;
    }

    /// Install or remove the near-the-money filter directly
    pub fn set_filter(&mut self, filter: Option<DeltaFilter>) {
        self.filter = filter;
    }

    /// Update the spot used by the delta filter; no-op when it is disabled
    pub fn set_spot(&mut self, symbol: &str, spot: f64) {
        if let Some(filter) = self.filter.as_mut() {
            filter.context.set_spot(symbol, spot);
        }
    }

    /// Evaluate one cycle of quotes
    ///
    /// Alerts come back in the order their quotes appear in `updates`.
    pub fn evaluate(&mut self, updates: &[QuoteUpdate]) -> Vec<SpikeAlert> {
        let threshold = self.config.threshold_percent;
        let mut alerts = Vec::new();

        for update in updates {
            self.stats.quotes_evaluated += 1;

            if let Some(filter) = &self.filter {
                match filter.admit(&update.quote) {
                    Admission::Rejected { .. } => {
                        self.stats.filtered_out += 1;
                        continue;
                    }
                    Admission::Undeterminable => {
                        self.stats.undeterminable += 1;
                        continue;
                    }
                    Admission::Admitted { .. } | Admission::NoContext => {}
                }
            }

            let Some(old_iv) = update.previous_iv else {
                self.stats.first_observations += 1;
                continue;
            };
            if old_iv.is_nan() || old_iv <= 0.0 || !update.quote.iv.is_finite() {
                self.stats.undeterminable += 1;
                continue;
            }

            let alert = SpikeAlert::new(
                update.quote.contract.clone(),
                old_iv,
                update.quote.iv,
                update.quote.timestamp,
            );

            if alert.change_percent.abs() >= threshold {
                tracing::debug!("Spike: {}", alert);
                alerts.push(alert);
            }
        }

        self.stats.cycles_evaluated += 1;
        self.stats.spikes_detected += alerts.len() as u64;
        if let Some(last) = alerts.last() {
            self.stats.last_spike_at = Some(last.timestamp);
        }
        for alert in &alerts {
            self.history.push(alert.clone());
        }

        alerts
    }

    /// Most recent alerts, newest first
    pub fn recent_spikes(&self, limit: usize) -> Vec<SpikeAlert> {
        self.history.recent(limit)
    }

    pub fn stats(&self) -> DetectorStats {
        DetectorStats {
            threshold_percent: self.config.threshold_percent,
            delta_filter_enabled: self.filter.is_some(),
            alerts_retained: self.history.len(),
            ..self.stats.clone()
        }
    }
}

impl Default for SpikeDetector {
    fn default() -> Self {
        Self::new()
    }
}
