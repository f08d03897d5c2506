//! # IV Spike - Implied Volatility Spike Monitor
//!
//! Watches the implied volatility of NSE index and stock options and raises
//! an alert whenever a contract's IV jumps (or drops) by more than a
//! threshold between two consecutive observations.
//!
//! ## Overview
//!
//! Each scan cycle:
//! - **Feed**: produces one quote per sampled contract, with the IV held
//!   before the cycle attached
//! - **Detector**: compares old and new IV per contract, optionally only for
//!   near-the-money (|delta| ≈ 0.40) contracts
//! - **Notifier**: formats the cycle's alerts into one message and sends it
//!   to Telegram and/or the console
//!
//! ## Key Components
//!
//! - **Black-Scholes**: prices, delta and a bracketed implied-vol solver
//! - **Simulated feed**: seeded random walk around per-symbol base IVs
//! - **Spike detector**: threshold test, delta pre-filter, bounded history
//! - **Monitor**: fixed-interval tokio loop with a query handle
//!
//! ## Usage
//!
//! ```rust,no_run
//! use iv_spike::prelude::*;
//! use std::time::Duration;
//!
//! # async fn run() {
//! let config = AppConfig::default();
//! let feed = SimulatedFeed::new(config.feed.clone());
//! let detector = SpikeDetector::with_config(config.detector.clone());
//! let notifier = NotificationManager::from_config(&config.notify);
//!
//! let mut monitor = SpikeMonitor::new(feed, detector, notifier, Duration::from_secs(1));
//! let handle = monitor.handle();
//!
//! let (_stop, shutdown) = tokio::sync::watch::channel(false);
//! monitor.run(shutdown).await;
//! println!("{:?}", handle.get_recent_spikes(10));
//! # }
//! ```
//!
//! ## What This Does NOT Do
//!
//! - Connect to a live exchange feed
//! - Persist IV history across restarts
//! - Suppress repeated alerts for the same contract

pub mod config;
pub mod core;
pub mod data;
pub mod models;
pub mod monitor;
pub mod notify;
pub mod spikes;

/// Prelude with commonly used types
pub mod prelude {
    // Core types
    pub use crate::core::{
        OptionContract, OptionQuote, OptionType, QuoteUpdate, SpikeAlert, SpikeError,
        SpikeResult,
    };

    // Configuration
    pub use crate::config::{AppConfig, ScanConfig};

    // Market data
    pub use crate::data::{
        FeedConfig, IvStore, MarketFeed, SimulatedFeed, SimulationStats, StrikeLadder,
        SymbolConfig, WalkParams,
    };

    // Models
    pub use crate::models::{
        delta as bs_delta, implied_volatility, norm_cdf, price as bs_price,
        solve_implied_volatility, IvSolveError,
    };

    // Spike detection
    pub use crate::spikes::{
        screen_by_delta, Admission, DeltaBand, DeltaFilter, DeltaFilterConfig, DetectorStats,
        PricingContext, ScreenedQuote, SpikeConfig, SpikeDetector, VolatilitySource,
    };

    // Notifications
    pub use crate::notify::{
        ConsoleChannel, NotificationChannel, NotificationManager, NotificationStats,
        NotifyConfig, TelegramChannel, TelegramConfig,
    };

    // Monitor
    pub use crate::monitor::{MonitorHandle, SpikeMonitor, SystemStats};
}

// Re-export main types at crate root
pub use crate::core::{SpikeError, SpikeResult};
pub use crate::monitor::{MonitorHandle, SpikeMonitor};
