//! Core data types for the IV spike monitor
//!
//! Defines fundamental types:
//! - OptionContract: symbol, strike, expiry, type (call/put)
//! - OptionQuote / QuoteUpdate: one observation per cycle
//! - SpikeAlert: a detected IV move

pub mod alert;
pub mod error;
pub mod option;
pub mod quote;

pub use alert::*;
pub use error::*;
pub use option::*;
pub use quote::*;
