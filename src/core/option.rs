//! Option contract definitions
//!
//! A contract is the identity of one implied-volatility time series:
//! `(symbol, strike, expiry, option type)`.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Option type (Call or Put)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OptionType {
    Call,
    Put,
}

impl OptionType {
    pub const BOTH: [OptionType; 2] = [OptionType::Call, OptionType::Put];

    /// Intrinsic value at given spot
    pub fn intrinsic(&self, spot: f64, strike: f64) -> f64 {
        match self {
            OptionType::Call => (spot - strike).max(0.0),
            OptionType::Put => (strike - spot).max(0.0),
        }
    }

    /// Exchange code used on NSE/BSE option symbols ("CE" / "PE")
    pub fn code(&self) -> &'static str {
        match self {
            OptionType::Call => "CE",
            OptionType::Put => "PE",
        }
    }
}

impl fmt::Display for OptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Identity of one listed option
///
/// Immutable once built; used as the key of the IV state map.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OptionContract {
    /// Underlying symbol (e.g., "NIFTY", "RELIANCE")
    pub symbol: String,
    /// Strike price
    pub strike: u32,
    /// Expiration date
    pub expiry: NaiveDate,
    /// Option type (Call/Put)
    pub option_type: OptionType,
}

impl OptionContract {
    pub fn new(
        symbol: impl Into<String>,
        strike: u32,
        expiry: NaiveDate,
        option_type: OptionType,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            strike,
            expiry,
            option_type,
        }
    }

    /// Strike as a float for pricing
    pub fn strike_price(&self) -> f64 {
        f64::from(self.strike)
    }

    /// Time to expiry in years from given date (negative once expired)
    pub fn time_to_expiry(&self, from: NaiveDate) -> f64 {
        let days = (self.expiry - from).num_days();
        days as f64 / 365.25
    }

    /// Flat key, e.g. `NIFTY_20000_2025-06-12_CE`
    pub fn key(&self) -> String {
        format!(
            "{}_{}_{}_{}",
            self.symbol,
            self.strike,
            self.expiry,
            self.option_type.code()
        )
    }
}

impl fmt::Display for OptionContract {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}{} (Exp: {})",
            self.symbol, self.strike, self.option_type, self.expiry
        )
    }
}
