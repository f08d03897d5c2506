//! Market data source interface

use serde::Serialize;

use crate::core::QuoteUpdate;

use super::state::IvStore;

/// A source of option quotes, polled once per scan cycle
///
/// `fetch` never fails: an internal error yields an empty cycle. Each
/// returned update carries the IV the feed held for the contract before
/// this cycle's observation.
pub trait MarketFeed: Send {
    /// Feed name for logs
    fn name(&self) -> &str;

    /// Produce one cycle of quotes
    fn fetch(&mut self) -> Vec<QuoteUpdate>;

    /// Shared view of the per-contract IV state
    fn store(&self) -> IvStore;

    /// Symbols this feed monitors
    fn symbols(&self) -> Vec<String>;
}

/// Feed statistics for the query surface
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationStats {
    pub total_options_tracked: usize,
    pub symbols_monitored: Vec<String>,
    pub initialized: bool,
    pub cycles_completed: u64,
}

impl SimulationStats {
    pub fn collect(store: &IvStore, symbols: Vec<String>) -> Self {
        store.read(|state| Self {
            total_options_tracked: state.len(),
            symbols_monitored: symbols,
            initialized: state.initialized(),
            cycles_completed: state.cycles(),
        })
    }
}
