//! Near-the-money screen
//!
//! Restricts evaluation to contracts whose |delta| lies in a band around
//! 0.40. Delta needs a spot, a rate and a time to expiry; contracts whose
//! symbol has no spot are admitted unfiltered.

use std::collections::HashMap;

use chrono::{NaiveDate, Utc};
use serde::Serialize;

use crate::core::OptionQuote;
use crate::models::{delta, implied_volatility};

use super::{DeltaFilterConfig, VolatilitySource};

/// Closed |delta| band
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeltaBand {
    pub min: f64,
    pub max: f64,
}

impl DeltaBand {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, delta: f64) -> bool {
        let d = delta.abs();
        d >= self.min && d <= self.max
    }
}

impl Default for DeltaBand {
    fn default() -> Self {
        Self::new(0.38, 0.42)
    }
}

/// Market context needed to compute delta
#[derive(Debug, Clone, Default)]
pub struct PricingContext {
    spots: HashMap<String, f64>,
    pub risk_free_rate: f64,
    /// Date used for time to expiry; today when unset
    pub valuation_date: Option<NaiveDate>,
}

impl PricingContext {
    pub fn new(risk_free_rate: f64) -> Self {
        Self {
            risk_free_rate,
            ..Default::default()
        }
    }

    pub fn with_valuation_date(mut self, date: NaiveDate) -> Self {
        self.valuation_date = Some(date);
        self
    }

    pub fn set_spot(&mut self, symbol: impl Into<String>, spot: f64) {
        self.spots.insert(symbol.into(), spot);
    }

    pub fn spot(&self, symbol: &str) -> Option<f64> {
        self.spots.get(symbol).copied()
    }

    pub fn valuation_date(&self) -> NaiveDate {
        self.valuation_date.unwrap_or_else(|| Utc::now().date_naive())
    }
}

/// Outcome of screening one quote
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Admission {
    /// |delta| inside the band; `vol` is the fraction used
    Admitted { vol: f64, delta: f64 },
    /// |delta| outside the band
    Rejected { delta: f64 },
    /// Delta could not be computed (no IV solution or bad inputs)
    Undeterminable,
    /// No spot for the symbol; the filter does not apply
    NoContext,
}

impl Admission {
    pub fn is_eligible(&self) -> bool {
        matches!(self, Admission::Admitted { .. } | Admission::NoContext)
    }
}

#[derive(Debug, Clone)]
pub struct DeltaFilter {
    pub band: DeltaBand,
    pub source: VolatilitySource,
    pub context: PricingContext,
}

impl DeltaFilter {
    pub fn new(band: DeltaBand, source: VolatilitySource, context: PricingContext) -> Self {
        Self {
            band,
            source,
            context,
        }
    }

    /// Build from configuration; `None` when the filter is disabled
    pub fn from_config(config: &DeltaFilterConfig) -> Option<Self> {
        if !config.enabled {
            return None;
        }
        let mut context = PricingContext::new(config.risk_free_rate);
        for (symbol, &spot) in &config.spots {
            context.set_spot(symbol.clone(), spot);
        }
        Some(Self::new(
            DeltaBand::new(config.min_abs_delta, config.max_abs_delta),
            config.volatility_source,
            context,
        ))
    }

    pub fn admit(&self, quote: &OptionQuote) -> Admission {
        let contract = &quote.contract;
        let Some(spot) = self.context.spot(&contract.symbol) else {
            return Admission::NoContext;
        };

        let time = contract.time_to_expiry(self.context.valuation_date());
        let rate = self.context.risk_free_rate;
        let strike = contract.strike_price();

        let vol = match self.source {
            VolatilitySource::QuotedIv => quote.iv_fraction(),
            VolatilitySource::ImpliedFromPrice => match implied_volatility(
                quote.last_price,
                spot,
                strike,
                time,
                rate,
                contract.option_type,
            ) {
                Some(vol) => vol,
                None => return Admission::Undeterminable,
            },
        };

        match delta(spot, strike, time, rate, vol, contract.option_type) {
            Ok(d) if self.band.contains(d) => Admission::Admitted { vol, delta: d },
            Ok(d) => Admission::Rejected { delta: d },
            Err(_) => Admission::Undeterminable,
        }
    }
}

/// A quote that passed the screen, with the IV solved from its price
#[derive(Debug, Clone, Serialize)]
pub struct ScreenedQuote {
    pub quote: OptionQuote,
    /// Implied volatility as a fraction
    pub iv: f64,
    pub delta: f64,
}

/// Keep only quotes whose price-implied delta falls in `band`
///
/// IV is solved from each quote's `last_price`; quotes without a solution
/// are dropped.
pub fn screen_by_delta(
    quotes: &[OptionQuote],
    spot: f64,
    time: f64,
    rate: f64,
    band: DeltaBand,
) -> Vec<ScreenedQuote> {
    quotes
        .iter()
        .filter_map(|quote| {
            let contract = &quote.contract;
            let strike = contract.strike_price();
            let iv = implied_volatility(
                quote.last_price,
                spot,
                strike,
                time,
                rate,
                contract.option_type,
            )?;
            let d = delta(spot, strike, time, rate, iv, contract.option_type).ok()?;
            band.contains(d).then(|| ScreenedQuote {
                quote: quote.clone(),
                iv,
                delta: d,
            })
        })
        .collect()
}
