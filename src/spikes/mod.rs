//! IV Spike Detection
//!
//! A spike is a relative IV change between two consecutive observations of
//! the same contract whose magnitude reaches the configured threshold.
//!
//! Pipeline per cycle:
//! 1. **Eligibility** (optional): near-the-money delta screen
//! 2. **Comparison**: current IV vs the contract's previous IV
//! 3. **Recording**: alerts kept in a bounded most-recent buffer

mod config;
mod detector;
mod filter;
mod history;

pub use config::*;
pub use detector::*;
pub use filter::*;
pub use history::*;
