//! Scanning loop
//!
//! Every scan interval the monitor polls the feed, runs the detector over
//! the cycle and hands any alerts to the notification manager on a spawned
//! task, so a slow channel never delays the next cycle. A tick that fires
//! while a cycle is still running is skipped. Shutdown is observed only
//! between cycles, and pending deliveries are awaited before `run` returns.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinSet;
use tokio::time::MissedTickBehavior;

use crate::core::{QuoteUpdate, SpikeAlert};
use crate::data::{IvStore, MarketFeed, SimulationStats};
use crate::notify::{NotificationManager, NotificationStats};
use crate::spikes::{DetectorStats, SpikeDetector};

/// Scheduler counters
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchedulerStats {
    pub running: bool,
    pub cycles_run: u64,
    pub scan_interval_secs: f64,
}

/// Everything the query surface reports at once
#[derive(Debug, Clone, Serialize)]
pub struct SystemStats {
    pub timestamp: DateTime<Utc>,
    pub simulation: SimulationStats,
    pub detector: DetectorStats,
    pub notifications: NotificationStats,
    pub scheduler: SchedulerStats,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub running: bool,
    pub timestamp: DateTime<Utc>,
}

/// What one cycle produced
#[derive(Debug, Clone, Default)]
pub struct CycleReport {
    pub quotes: usize,
    pub alerts: Vec<SpikeAlert>,
}

struct Shared {
    detector: Mutex<SpikeDetector>,
    notifier: Arc<NotificationManager>,
    store: IvStore,
    symbols: Vec<String>,
    scan_interval: Duration,
    running: AtomicBool,
    cycles_run: AtomicU64,
}

impl Shared {
    fn detector(&self) -> MutexGuard<'_, SpikeDetector> {
        self.detector.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Read-only view of a monitor, usable while it runs
#[derive(Clone)]
pub struct MonitorHandle {
    shared: Arc<Shared>,
}

impl MonitorHandle {
    /// Most recent alerts, newest first
    pub fn get_recent_spikes(&self, limit: usize) -> Vec<SpikeAlert> {
        self.shared.detector().recent_spikes(limit)
    }

    pub fn get_detector_stats(&self) -> DetectorStats {
        self.shared.detector().stats()
    }

    pub fn get_simulation_stats(&self) -> SimulationStats {
        SimulationStats::collect(&self.shared.store, self.shared.symbols.clone())
    }

    pub fn get_notification_stats(&self) -> NotificationStats {
        self.shared.notifier.stats()
    }

    pub fn get_scheduler_stats(&self) -> SchedulerStats {
        SchedulerStats {
            running: self.is_running(),
            cycles_run: self.shared.cycles_run.load(Ordering::Relaxed),
            scan_interval_secs: self.shared.scan_interval.as_secs_f64(),
        }
    }

    pub fn get_stats(&self) -> SystemStats {
        SystemStats {
            timestamp: Utc::now(),
            simulation: self.get_simulation_stats(),
            detector: self.get_detector_stats(),
            notifications: self.get_notification_stats(),
            scheduler: self.get_scheduler_stats(),
        }
    }

    pub fn health(&self) -> HealthStatus {
        let running = self.is_running();
        HealthStatus {
            status: if running { "running" } else { "stopped" },
            running,
            timestamp: Utc::now(),
        }
    }

    pub fn is_running(&self) -> bool {
        self.shared.running.load(Ordering::Relaxed)
    }

    /// Update the spot used by the detector's delta filter
    pub fn set_spot(&self, symbol: &str, spot: f64) {
        self.shared.detector().set_spot(symbol, spot);
    }
}

pub struct SpikeMonitor<F: MarketFeed> {
    feed: F,
    shared: Arc<Shared>,
    dispatches: JoinSet<bool>,
    startup_test: bool,
    max_cycles: Option<u64>,
}

impl<F: MarketFeed> SpikeMonitor<F> {
    pub fn new(
        feed: F,
        detector: SpikeDetector,
        notifier: NotificationManager,
        scan_interval: Duration,
    ) -> Self {
        let shared = Shared {
            detector: Mutex::new(detector),
            notifier: Arc::new(notifier),
            store: feed.store(),
            symbols: feed.symbols(),
            scan_interval,
            running: AtomicBool::new(false),
            cycles_run: AtomicU64::new(0),
        };
        Self {
            feed,
            shared: Arc::new(shared),
            dispatches: JoinSet::new(),
            startup_test: false,
            max_cycles: None,
        }
    }

    /// Send the test message once when `run` starts
    pub fn with_startup_test(mut self, enabled: bool) -> Self {
        self.startup_test = enabled;
        self
    }

    /// Stop `run` on its own after this many cycles
    pub fn with_max_cycles(mut self, cycles: Option<u64>) -> Self {
        self.max_cycles = cycles;
        self
    }

    pub fn handle(&self) -> MonitorHandle {
        MonitorHandle {
            shared: Arc::clone(&self.shared),
        }
    }

    pub fn feed(&self) -> &F {
        &self.feed
    }

    /// Deliveries spawned but not yet awaited
    pub fn pending_dispatches(&self) -> usize {
        self.dispatches.len()
    }

    /// Run one fetch, detect, dispatch cycle
    ///
    /// Must be called from within a tokio runtime. Delivery happens on a
    /// spawned task; use `drain_dispatches` to wait for it.
    pub async fn run_cycle(&mut self) -> CycleReport {
        self.reap_dispatches();
        tracing::debug!("Starting IV spike monitoring cycle");

        let updates = self.fetch();
        self.shared.cycles_run.fetch_add(1, Ordering::Relaxed);

        if updates.is_empty() {
            tracing::warn!("No option data received from {}", self.feed.name());
            return CycleReport::default();
        }

        let alerts = self.shared.detector().evaluate(&updates);

        if alerts.is_empty() {
            tracing::debug!("No IV spikes in {} quotes", updates.len());
        } else {
            tracing::info!("Detected {} IV spikes in {} quotes", alerts.len(), updates.len());
            let notifier = Arc::clone(&self.shared.notifier);
            let batch = alerts.clone();
            self.dispatches.spawn(async move {
                let delivered = notifier.send_spike_alerts(&batch).await;
                if delivered {
                    tracing::info!("Spike notifications sent");
                } else {
                    tracing::error!("Failed to send spike notifications");
                }
                delivered
            });
        }

        CycleReport {
            quotes: updates.len(),
            alerts,
        }
    }

    /// Run cycles every scan interval until `shutdown` turns true
    ///
    /// A closed shutdown channel also stops the loop.
    pub async fn run(&mut self, mut shutdown: watch::Receiver<bool>) {
        self.shared.running.store(true, Ordering::Relaxed);
        tracing::info!(
            "Scheduler started - monitoring every {:?}",
            self.shared.scan_interval
        );

        if self.startup_test {
            let notifier = Arc::clone(&self.shared.notifier);
            self.dispatches.spawn(async move {
                let ok = notifier.test_notifications().await;
                if ok {
                    tracing::info!("Notification system tested successfully");
                } else {
                    tracing::warn!("Notification system test failed");
                }
                ok
            });
        }

        let mut interval = tokio::time::interval(self.shared.scan_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut completed = 0u64;

        while !*shutdown.borrow() {
            tokio::select! {
                _ = interval.tick() => {
                    self.run_cycle().await;
                    completed += 1;
                    if self.max_cycles.is_some_and(|max| completed >= max) {
                        tracing::info!("Reached {} cycles", completed);
                        break;
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
            }
        }

        tracing::info!("Shutting down IV spike monitor");
        self.drain_dispatches().await;
        self.shared.running.store(false, Ordering::Relaxed);
    }

    /// Await every pending delivery; returns how many succeeded
    pub async fn drain_dispatches(&mut self) -> usize {
        let mut delivered = 0;
        while let Some(result) = self.dispatches.join_next().await {
            match result {
                Ok(true) => delivered += 1,
                Ok(false) => {}
                Err(e) => tracing::error!("Dispatch task failed: {}", e),
            }
        }
        delivered
    }

    fn reap_dispatches(&mut self) {
        while let Some(result) = self.dispatches.try_join_next() {
            if let Err(e) = result {
                tracing::error!("Dispatch task failed: {}", e);
            }
        }
    }

    fn fetch(&mut self) -> Vec<QuoteUpdate> {
        let feed = &mut self.feed;
        match catch_unwind(AssertUnwindSafe(|| feed.fetch())) {
            Ok(updates) => updates,
            Err(_) => {
                tracing::error!("Feed {} panicked; skipping cycle", self.feed.name());
                Vec::new()
            }
        }
    }
}
