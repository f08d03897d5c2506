//! Black-Scholes Model
//!
//! Provides:
//! - European option pricing
//! - Delta
//! - Implied volatility solver (bracketed Brent search)
//!
//! Volatilities and rates are plain fractions here (0.2 = 20%). Quotes carry
//! IV in percent; convert with [`crate::core::OptionQuote::iv_fraction`].

use std::f64::consts::SQRT_2;

use roots::{find_root_brent, Convergency, SearchError};
use statrs::function::erf::erfc;
use thiserror::Error;

use crate::core::{OptionType, SpikeError, SpikeResult};

/// Lower edge of the IV search bracket
pub const IV_LOWER_BOUND: f64 = 1e-4;
/// Upper edge of the IV search bracket
pub const IV_UPPER_BOUND: f64 = 5.0;
/// Iteration budget for the IV search
pub const IV_MAX_ITERATIONS: usize = 1000;
/// Bracket width (in volatility) at which the search stops
const IV_VOL_TOLERANCE: f64 = 1e-12;
/// Price residual, relative to the market price, accepted as exact
const IV_PRICE_TOLERANCE: f64 = 1e-12;

/// Standard normal CDF
pub fn norm_cdf(x: f64) -> f64 {
    0.5 * erfc(-x / SQRT_2)
}

/// Black-Scholes d1 and d2 terms
pub fn d1_d2(spot: f64, strike: f64, time: f64, rate: f64, vol: f64) -> (f64, f64) {
    let vol_sqrt_t = vol * time.sqrt();
    let d1 = ((spot / strike).ln() + (rate + 0.5 * vol * vol) * time) / vol_sqrt_t;
    (d1, d1 - vol_sqrt_t)
}

fn validate_inputs(spot: f64, strike: f64, time: f64, rate: f64, vol: f64) -> SpikeResult<()> {
    if !(spot.is_finite() && strike.is_finite() && time.is_finite() && rate.is_finite()) {
        return Err(SpikeError::invalid_input("Non-finite pricing input"));
    }
    if spot <= 0.0 || strike <= 0.0 {
        return Err(SpikeError::invalid_input("Non-positive spot or strike"));
    }
    if !vol.is_finite() || vol <= 0.0 {
        return Err(SpikeError::invalid_input("Non-positive volatility"));
    }
    Ok(())
}

// Callers have validated spot, strike and vol.
fn price_unchecked(
    spot: f64,
    strike: f64,
    time: f64,
    rate: f64,
    vol: f64,
    option_type: OptionType,
) -> f64 {
    if time <= 0.0 {
        return option_type.intrinsic(spot, strike);
    }

    let (d1, d2) = d1_d2(spot, strike, time, rate, vol);
    let df = (-rate * time).exp();

    match option_type {
        OptionType::Call => spot * norm_cdf(d1) - strike * df * norm_cdf(d2),
        OptionType::Put => strike * df * norm_cdf(-d2) - spot * norm_cdf(-d1),
    }
}

/// Black-Scholes European option price
///
/// Returns intrinsic value when `time <= 0`.
pub fn price(
    spot: f64,
    strike: f64,
    time: f64,
    rate: f64,
    vol: f64,
    option_type: OptionType,
) -> SpikeResult<f64> {
    validate_inputs(spot, strike, time, rate, vol)?;
    Ok(price_unchecked(spot, strike, time, rate, vol, option_type))
}

/// Black-Scholes delta: N(d1) for calls, N(d1) - 1 for puts
///
/// At or past expiry the delta collapses to the step function of the payoff.
pub fn delta(
    spot: f64,
    strike: f64,
    time: f64,
    rate: f64,
    vol: f64,
    option_type: OptionType,
) -> SpikeResult<f64> {
    validate_inputs(spot, strike, time, rate, vol)?;

    if time <= 0.0 {
        let delta = match option_type {
            OptionType::Call => if spot > strike { 1.0 } else { 0.0 },
            OptionType::Put => if spot < strike { -1.0 } else { 0.0 },
        };
        return Ok(delta);
    }

    let (d1, _) = d1_d2(spot, strike, time, rate, vol);
    Ok(match option_type {
        OptionType::Call => norm_cdf(d1),
        OptionType::Put => norm_cdf(d1) - 1.0,
    })
}

/// Why an implied volatility could not be determined
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum IvSolveError {
    #[error("invalid pricing input")]
    InvalidInput,
    #[error("price objective does not change sign over the volatility bracket")]
    NoBracket,
    #[error("solver did not converge within the iteration budget")]
    NoConvergence,
}

/// Stopping rule for the IV search
///
/// Deep out-of-the-money prices can be far below any fixed absolute
/// tolerance, so the residual test scales with the market price and the
/// search otherwise runs until the bracket itself is narrow.
struct IvConvergency {
    price_tolerance: f64,
    max_iter: usize,
}

impl IvConvergency {
    fn for_price(market_price: f64) -> Self {
        Self {
            price_tolerance: market_price.abs() * IV_PRICE_TOLERANCE,
            max_iter: IV_MAX_ITERATIONS,
        }
    }
}

impl Convergency<f64> for IvConvergency {
    fn is_root_found(&mut self, y: f64) -> bool {
        y.abs() <= self.price_tolerance
    }

    fn is_converged(&mut self, x1: f64, x2: f64) -> bool {
        (x1 - x2).abs() < IV_VOL_TOLERANCE
    }

    fn is_iteration_limit_reached(&mut self, iter: usize) -> bool {
        iter >= self.max_iter
    }
}

/// Solve for the volatility that reproduces `market_price`
///
/// Searches `[IV_LOWER_BOUND, IV_UPPER_BOUND]` with Brent's method. The
/// bracket is checked for a sign change before iterating.
pub fn solve_implied_volatility(
    market_price: f64,
    spot: f64,
    strike: f64,
    time: f64,
    rate: f64,
    option_type: OptionType,
) -> Result<f64, IvSolveError> {
    if !market_price.is_finite() || time <= 0.0 {
        return Err(IvSolveError::InvalidInput);
    }
    validate_inputs(spot, strike, time, rate, IV_LOWER_BOUND)
        .map_err(|_| IvSolveError::InvalidInput)?;

    let objective =
        |vol: f64| price_unchecked(spot, strike, time, rate, vol, option_type) - market_price;

    let f_low = objective(IV_LOWER_BOUND);
    let f_high = objective(IV_UPPER_BOUND);
    if f_low == 0.0 {
        return Ok(IV_LOWER_BOUND);
    }
    if f_high == 0.0 {
        return Ok(IV_UPPER_BOUND);
    }
    if f_low.signum() == f_high.signum() {
        return Err(IvSolveError::NoBracket);
    }

    let mut convergency = IvConvergency::for_price(market_price);

    find_root_brent(IV_LOWER_BOUND, IV_UPPER_BOUND, &objective, &mut convergency).map_err(
        |err| match err {
            SearchError::NoBracketing => IvSolveError::NoBracket,
            _ => IvSolveError::NoConvergence,
        },
    )
}

/// Implied volatility, or `None` when it cannot be determined
///
/// `None` means "skip this contract", not a failure of the caller.
pub fn implied_volatility(
    market_price: f64,
    spot: f64,
    strike: f64,
    time: f64,
    rate: f64,
    option_type: OptionType,
) -> Option<f64> {
    match solve_implied_volatility(market_price, spot, strike, time, rate, option_type) {
        Ok(vol) => Some(vol),
        Err(err) => {
            tracing::debug!(
                "IV undeterminable for price {:.4} (S={}, K={}, T={:.4}): {}",
                market_price, spot, strike, time, err
            );
            None
        }
    }
}
