//! Per-contract IV state
//!
//! The feed is the only writer. A cycle's new values are staged and
//! committed under one write lock, so readers see either the previous cycle
//! or the new one in full.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use crate::core::OptionContract;

/// Last known IV of one contract
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IvEntry {
    /// IV in percent
    pub iv: f64,
    /// Cycle in which this value was recorded
    pub cycle: u64,
}

/// Contract -> last known IV. Entries are created lazily and never removed.
#[derive(Debug, Clone, Default)]
pub struct IvState {
    entries: HashMap<OptionContract, IvEntry>,
    cycles: u64,
}

impl IvState {
    pub fn get(&self, contract: &OptionContract) -> Option<&IvEntry> {
        self.entries.get(contract)
    }

    pub fn iv(&self, contract: &OptionContract) -> Option<f64> {
        self.entries.get(contract).map(|e| e.iv)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of committed cycles
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// True once at least one cycle has been committed
    pub fn initialized(&self) -> bool {
        self.cycles > 0
    }

    pub fn iter(&self) -> impl Iterator<Item = (&OptionContract, &IvEntry)> {
        self.entries.iter()
    }
}

/// Shared handle to the IV state
#[derive(Debug, Clone, Default)]
pub struct IvStore {
    inner: Arc<RwLock<IvState>>,
}

impl IvStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` against a consistent view of the state
    pub fn read<R>(&self, f: impl FnOnce(&IvState) -> R) -> R {
        let guard = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        f(&guard)
    }

    /// Owned copy of the current state
    pub fn snapshot(&self) -> IvState {
        self.read(|state| state.clone())
    }

    pub fn iv(&self, contract: &OptionContract) -> Option<f64> {
        self.read(|state| state.iv(contract))
    }

    pub fn len(&self) -> usize {
        self.read(|state| state.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn cycles(&self) -> u64 {
        self.read(|state| state.cycles())
    }

    /// Apply one cycle's worth of new IVs atomically; returns the cycle number
    pub fn commit(&self, updates: impl IntoIterator<Item = (OptionContract, f64)>) -> u64 {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        let cycle = guard.cycles + 1;
        for (contract, iv) in updates {
            guard.entries.insert(contract, IvEntry { iv, cycle });
        }
        guard.cycles = cycle;
        cycle
    }
}
