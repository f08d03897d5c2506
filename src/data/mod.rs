//! Market data
//!
//! Handles:
//! - The `MarketFeed` interface a real market-data client plugs into
//! - Shared per-contract IV state
//! - The simulated option chain feed

pub mod config;
pub mod feed;
pub mod simulator;
pub mod state;

pub use config::*;
pub use feed::*;
pub use simulator::*;
pub use state::*;
