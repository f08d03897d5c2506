//! Pricing Models
//!
//! Only the lognormal closed-form (Black-Scholes) model is used: it turns
//! market prices into implied volatilities and supplies delta for the
//! near-the-money screen.

pub mod black_scholes;

pub use black_scholes::*;
