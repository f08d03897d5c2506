//! Market feed configuration

use chrono::{Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::core::{SpikeError, SpikeResult};

/// Evenly spaced strike ladder, `end` exclusive
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrikeLadder {
    pub start: u32,
    pub end: u32,
    pub step: u32,
}

impl StrikeLadder {
    pub fn new(start: u32, end: u32, step: u32) -> Self {
        Self { start, end, step }
    }

    pub fn strikes(&self) -> Vec<u32> {
        if self.step == 0 {
            return Vec::new();
        }
        (self.start..self.end).step_by(self.step as usize).collect()
    }

    pub fn len(&self) -> usize {
        self.strikes().len()
    }

    pub fn is_empty(&self) -> bool {
        self.step == 0 || self.start >= self.end
    }
}

/// One monitored underlying
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolConfig {
    pub name: String,
    /// Typical IV level in percent; falls back to `FeedConfig::default_base_iv`
    #[serde(default)]
    pub base_iv: Option<f64>,
    pub strikes: StrikeLadder,
}

impl SymbolConfig {
    pub fn new(name: impl Into<String>, base_iv: f64, strikes: StrikeLadder) -> Self {
        Self {
            name: name.into(),
            base_iv: Some(base_iv),
            strikes,
        }
    }
}

/// Parameters of the biased IV random walk
///
/// All move sizes are relative (0.05 = 5% of the current IV).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WalkParams {
    /// Probability of a small move on each step
    pub small_move_probability: f64,
    /// Small moves are uniform in [-small_move, +small_move]
    pub small_move: f64,
    /// Share of large moves that go up
    pub large_up_probability: f64,
    pub large_up_min: f64,
    pub large_up_max: f64,
    pub large_down_min: f64,
    pub large_down_max: f64,
    /// IV floor as a multiple of the symbol's base IV
    pub floor_multiple: f64,
    /// IV cap as a multiple of the symbol's base IV
    pub cap_multiple: f64,
    /// First observation is base IV plus uniform noise in [-noise, +noise]
    pub initial_noise: f64,
    /// Absolute floor (percent) for the first observation
    pub initial_floor: f64,
}

impl Default for WalkParams {
    fn default() -> Self {
        Self {
            small_move_probability: 0.85,
            small_move: 0.05,
            large_up_probability: 0.7,
            large_up_min: 0.05,
            large_up_max: 0.25,
            large_down_min: 0.05,
            large_down_max: 0.15,
            floor_multiple: 0.5,
            cap_multiple: 2.5,
            initial_noise: 5.0,
            initial_floor: 5.0,
        }
    }
}

impl WalkParams {
    /// Clamp band for a symbol with the given base IV
    pub fn bounds(&self, base_iv: f64) -> (f64, f64) {
        (base_iv * self.floor_multiple, base_iv * self.cap_multiple)
    }

    pub fn validate(&self) -> SpikeResult<()> {
        for (name, value) in [
            ("small_move_probability", self.small_move_probability),
            ("small_move", self.small_move),
            ("large_up_probability", self.large_up_probability),
            ("large_up_min", self.large_up_min),
            ("large_up_max", self.large_up_max),
            ("large_down_min", self.large_down_min),
            ("large_down_max", self.large_down_max),
            ("floor_multiple", self.floor_multiple),
            ("cap_multiple", self.cap_multiple),
            ("initial_noise", self.initial_noise),
            ("initial_floor", self.initial_floor),
        ] {
            if !value.is_finite() {
                return Err(SpikeError::config(format!("{} must be finite", name)));
            }
        }
        for (name, p) in [
            ("small_move_probability", self.small_move_probability),
            ("large_up_probability", self.large_up_probability),
        ] {
            if !(0.0..=1.0).contains(&p) {
                return Err(SpikeError::config(format!("{} must be in [0, 1]", name)));
            }
        }
        if self.small_move < 0.0 || self.initial_noise < 0.0 {
            return Err(SpikeError::config("move sizes must be non-negative"));
        }
        if self.large_up_min > self.large_up_max || self.large_down_min > self.large_down_max {
            return Err(SpikeError::config("large move ranges are inverted"));
        }
        if self.large_down_max >= 1.0 {
            return Err(SpikeError::config("large_down_max must be below 1.0"));
        }
        if self.floor_multiple <= 0.0 || self.floor_multiple > self.cap_multiple {
            return Err(SpikeError::config(
                "need 0 < floor_multiple <= cap_multiple",
            ));
        }
        Ok(())
    }
}

/// Simulated market feed configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    pub symbols: Vec<SymbolConfig>,
    /// Configured expiries; the nearest `expiries_per_cycle` are sampled
    pub expiries: Vec<NaiveDate>,
    /// Upper bound on strikes sampled per symbol per cycle
    pub strikes_per_cycle: usize,
    pub expiries_per_cycle: usize,
    /// Base IV (percent) for symbols without an explicit one
    pub default_base_iv: f64,
    pub walk: WalkParams,
    /// Fixed RNG seed for reproducible runs
    pub seed: Option<u64>,
}

impl Default for FeedConfig {
    fn default() -> Self {
        let today = Utc::now().date_naive();
        Self {
            symbols: vec![
                SymbolConfig::new("NIFTY", 20.0, StrikeLadder::new(19000, 22000, 50)),
                SymbolConfig::new("BANKNIFTY", 25.0, StrikeLadder::new(45000, 50000, 100)),
                SymbolConfig::new("FINNIFTY", 22.0, StrikeLadder::new(19000, 22000, 50)),
                SymbolConfig::new("SENSEX", 18.0, StrikeLadder::new(70000, 75000, 100)),
                SymbolConfig::new("RELIANCE", 28.0, StrikeLadder::new(2400, 2800, 50)),
                SymbolConfig::new("TCS", 24.0, StrikeLadder::new(3800, 4200, 50)),
                SymbolConfig::new("HDFCBANK", 26.0, StrikeLadder::new(1600, 1900, 25)),
                SymbolConfig::new("INFY", 30.0, StrikeLadder::new(1700, 2000, 25)),
            ],
            // Weekly, weekly, monthly, next month
            expiries: [7, 14, 28, 56]
                .iter()
                .map(|&days| today + Duration::days(days))
                .collect(),
            strikes_per_cycle: 10,
            expiries_per_cycle: 2,
            default_base_iv: 25.0,
            walk: WalkParams::default(),
            seed: None,
        }
    }
}

impl FeedConfig {
    pub fn symbol_names(&self) -> Vec<String> {
        self.symbols.iter().map(|s| s.name.clone()).collect()
    }

    pub fn base_iv(&self, symbol: &str) -> f64 {
        self.symbols
            .iter()
            .find(|s| s.name == symbol)
            .and_then(|s| s.base_iv)
            .unwrap_or(self.default_base_iv)
    }

    /// The nearest `expiries_per_cycle` configured expiries, ascending
    pub fn active_expiries(&self) -> Vec<NaiveDate> {
        let mut expiries = self.expiries.clone();
        expiries.sort();
        expiries.dedup();
        expiries.truncate(self.expiries_per_cycle);
        expiries
    }

    pub fn validate(&self) -> SpikeResult<()> {
        if self.symbols.is_empty() {
            return Err(SpikeError::config("no symbols configured"));
        }
        if self.expiries.is_empty() || self.expiries_per_cycle == 0 {
            return Err(SpikeError::config("no expiries configured"));
        }
        if !self.default_base_iv.is_finite() || self.default_base_iv <= 0.0 {
            return Err(SpikeError::config("default_base_iv must be positive"));
        }
        for symbol in &self.symbols {
            if symbol.strikes.is_empty() {
                return Err(SpikeError::config(format!(
                    "empty strike ladder for {}",
                    symbol.name
                )));
            }
            if let Some(base) = symbol.base_iv {
                if !base.is_finite() || base <= 0.0 {
                    return Err(SpikeError::config(format!(
                        "base IV for {} must be positive",
                        symbol.name
                    )));
                }
            }
        }
        self.walk.validate()
    }
}
