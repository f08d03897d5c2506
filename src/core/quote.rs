//! Option quote data
//!
//! One observation of a contract per scan cycle, plus the IV the feed held
//! for that contract just before the observation was applied.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::option::OptionContract;

/// Option market quote
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionQuote {
    /// The option contract
    pub contract: OptionContract,
    /// Flat contract key, `SYMBOL_STRIKE_EXPIRY_TYPE`
    pub key: String,
    /// Implied volatility in percent (20.0 = 20%)
    pub iv: f64,
    /// Last traded price
    pub last_price: f64,
    /// Trading volume
    pub volume: u64,
    /// Open interest
    pub open_interest: u64,
    /// Quote timestamp
    pub timestamp: DateTime<Utc>,
}

impl OptionQuote {
    pub fn new(contract: OptionContract, iv: f64) -> Self {
        Self {
            key: contract.key(),
            contract,
            iv,
            last_price: 0.0,
            volume: 0,
            open_interest: 0,
            timestamp: Utc::now(),
        }
    }

    /// IV as a plain fraction (0.2 = 20%) for the pricing model
    pub fn iv_fraction(&self) -> f64 {
        self.iv / 100.0
    }
}

/// A quote together with the IV recorded for the same contract on the
/// previous cycle. `previous_iv` is `None` on the first observation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteUpdate {
    pub quote: OptionQuote,
    pub previous_iv: Option<f64>,
}

impl QuoteUpdate {
    pub fn new(quote: OptionQuote, previous_iv: Option<f64>) -> Self {
        Self { quote, previous_iv }
    }

    pub fn is_first_observation(&self) -> bool {
        self.previous_iv.is_none()
    }

    /// Relative IV change in percent, if there is a usable previous reading
    pub fn change_percent(&self) -> Option<f64> {
        match self.previous_iv {
            Some(old) if old > 0.0 => Some((self.quote.iv - old) / old * 100.0),
            _ => None,
        }
    }
}
