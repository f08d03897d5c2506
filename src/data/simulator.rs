//! Simulated option chain feed
//!
//! Stands in for a broker market-data client. Each cycle samples a random
//! subset of every symbol's strike ladder over the nearest expiries and both
//! option types, and evolves each contract's IV with a biased random walk:
//!
//! - most steps are small symmetric moves
//! - the rest are large moves, mostly upward (spikes)
//! - every value is clamped to `[floor × base IV, cap × base IV]`

use chrono::Utc;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::core::{OptionContract, OptionQuote, OptionType, QuoteUpdate, SpikeResult};

use super::config::{FeedConfig, WalkParams};
use super::feed::MarketFeed;
use super::state::IvStore;

pub struct SimulatedFeed {
    config: FeedConfig,
    store: IvStore,
    rng: ChaCha8Rng,
}

impl SimulatedFeed {
    /// Create a feed; uses `config.seed` when set, entropy otherwise
    pub fn new(config: FeedConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        Self {
            config,
            store: IvStore::new(),
            rng,
        }
    }

    pub fn with_seed(config: FeedConfig, seed: u64) -> Self {
        Self {
            config,
            store: IvStore::new(),
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    pub fn config(&self) -> &FeedConfig {
        &self.config
    }

    /// Replace the configuration; takes effect on the next cycle.
    /// Tracked IVs are kept.
    pub fn set_config(&mut self, config: FeedConfig) {
        self.config = config;
    }

    /// IV for a contract seen for the first time
    fn initial_iv(&mut self, base_iv: f64) -> f64 {
        let walk = &self.config.walk;
        let noise = if walk.initial_noise > 0.0 {
            self.rng.gen_range(-walk.initial_noise..=walk.initial_noise)
        } else {
            0.0
        };
        let (low, high) = walk.bounds(base_iv);
        (base_iv + noise).max(walk.initial_floor).clamp(low, high)
    }

    /// One random-walk step from `current`
    pub(crate) fn evolve_iv(&mut self, current: f64, base_iv: f64) -> f64 {
        let change = relative_change(&mut self.rng, &self.config.walk);
        let (low, high) = self.config.walk.bounds(base_iv);
        (current * (1.0 + change)).clamp(low, high)
    }

    fn try_fetch(&mut self) -> SpikeResult<Vec<QuoteUpdate>> {
        self.config.validate()?;

        let expiries = self.config.active_expiries();
        let symbols = self.config.symbols.clone();
        let timestamp = Utc::now();

        let mut updates = Vec::new();
        let mut staged = Vec::new();

        for symbol in &symbols {
            let base_iv = self.config.base_iv(&symbol.name);
            let ladder = symbol.strikes.strikes();
            let count = self.config.strikes_per_cycle.min(ladder.len());
            let strikes: Vec<u32> = ladder
                .choose_multiple(&mut self.rng, count)
                .copied()
                .collect();

            for strike in strikes {
                for &expiry in &expiries {
                    for option_type in OptionType::BOTH {
                        let contract =
                            OptionContract::new(symbol.name.clone(), strike, expiry, option_type);
                        let previous_iv = self.store.iv(&contract);

                        let iv = match previous_iv {
                            Some(current) => self.evolve_iv(current, base_iv),
                            None => self.initial_iv(base_iv),
                        };

                        let mut quote = OptionQuote::new(contract.clone(), iv);
                        let last_price: f64 = self.rng.gen_range(10.0..=500.0);
                        quote.last_price = (last_price * 100.0).round() / 100.0;
                        quote.volume = self.rng.gen_range(100..=10_000);
                        quote.open_interest = self.rng.gen_range(1_000..=50_000);
                        quote.timestamp = timestamp;

                        staged.push((contract, iv));
                        updates.push(QuoteUpdate::new(quote, previous_iv));
                    }
                }
            }
        }

        self.store.commit(staged);
        Ok(updates)
    }
}

/// Draw a relative IV change according to the walk parameters
fn relative_change(rng: &mut impl Rng, walk: &WalkParams) -> f64 {
    if rng.gen::<f64>() < walk.small_move_probability {
        rng.gen_range(-walk.small_move..=walk.small_move)
    } else if rng.gen::<f64>() < walk.large_up_probability {
        rng.gen_range(walk.large_up_min..=walk.large_up_max)
    } else {
        -rng.gen_range(walk.large_down_min..=walk.large_down_max)
    }
}

impl MarketFeed for SimulatedFeed {
    fn name(&self) -> &str {
        "simulator"
    }

    fn fetch(&mut self) -> Vec<QuoteUpdate> {
        match self.try_fetch() {
            Ok(updates) => {
                tracing::info!("Simulated {} option data points", updates.len());
                updates
            }
            Err(e) => {
                tracing::error!("Error in data simulation: {}", e);
                Vec::new()
            }
        }
    }

    fn store(&self) -> IvStore {
        self.store.clone()
    }

    fn symbols(&self) -> Vec<String> {
        self.config.symbol_names()
    }
}
