//! End-to-end: simulated feed -> detector -> notification channel

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use iv_spike::prelude::*;

#[derive(Default)]
struct Recording {
    messages: Mutex<Vec<String>>,
}

impl Recording {
    fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

#[async_trait]
impl NotificationChannel for Recording {
    fn name(&self) -> &str {
        "recording"
    }

    fn is_configured(&self) -> bool {
        true
    }

    async fn send_message(&self, message: &str) -> SpikeResult<()> {
        self.messages.lock().unwrap().push(message.to_string());
        Ok(())
    }
}

fn nifty_feed(seed: u64) -> SimulatedFeed {
    // Ten strikes: every cycle samples the whole ladder
    let config = FeedConfig {
        symbols: vec![SymbolConfig::new(
            "NIFTY",
            20.0,
            StrikeLadder::new(21500, 22000, 50),
        )],
        ..Default::default()
    };
    SimulatedFeed::with_seed(config, seed)
}

fn build(threshold: f64, seed: u64) -> (SpikeMonitor<SimulatedFeed>, Arc<Recording>) {
    let recording = Arc::new(Recording::default());
    let mut notifier = NotificationManager::new(Duration::from_secs(5), 10);
    notifier.add_channel(recording.clone());

    let monitor = SpikeMonitor::new(
        nifty_feed(seed),
        SpikeDetector::with_config(SpikeConfig::with_threshold(threshold)),
        notifier,
        Duration::from_secs(1),
    );
    (monitor, recording)
}

#[tokio::test]
async fn cycles_alert_on_threshold_moves_only() {
    let (mut monitor, recording) = build(10.0, 42);
    let handle = monitor.handle();

    let first = monitor.run_cycle().await;
    assert_eq!(first.quotes, 40);
    assert!(first.alerts.is_empty());

    let mut cycles_with_alerts = 0;
    let mut total_alerts = 0;
    for _ in 0..30 {
        let report = monitor.run_cycle().await;
        assert_eq!(report.quotes, 40);
        for alert in &report.alerts {
            assert!(alert.change_percent.abs() >= 10.0);
            let expected = (alert.new_iv - alert.old_iv) / alert.old_iv * 100.0;
            assert!((alert.change_percent - expected).abs() < 1e-9);
            assert_eq!(alert.contract.symbol, "NIFTY");
        }
        if !report.alerts.is_empty() {
            cycles_with_alerts += 1;
        }
        total_alerts += report.alerts.len();
    }
    monitor.drain_dispatches().await;

    // 15% of steps are large moves, so 1200 observations produce some spikes
    assert!(total_alerts > 0);
    assert_eq!(recording.messages().len(), cycles_with_alerts);

    let stats = handle.get_stats();
    assert_eq!(stats.detector.spikes_detected, total_alerts as u64);
    assert_eq!(stats.detector.quotes_evaluated, 31 * 40);
    assert_eq!(stats.detector.first_observations, 40);
    assert_eq!(stats.simulation.cycles_completed, 31);
    assert_eq!(stats.simulation.total_options_tracked, 40);
    assert!(stats.simulation.initialized);
    assert_eq!(stats.notifications.messages_sent, cycles_with_alerts as u64);
    assert_eq!(stats.notifications.messages_failed, 0);

    let recent = handle.get_recent_spikes(total_alerts + 5);
    assert_eq!(recent.len(), total_alerts);
}

#[tokio::test]
async fn store_matches_last_cycle() {
    let (mut monitor, _recording) = build(10.0, 7);
    monitor.run_cycle().await;
    let report = monitor.run_cycle().await;
    assert_eq!(report.quotes, 40);

    let store = monitor.feed().store();
    let snapshot = store.snapshot();
    assert_eq!(snapshot.cycles(), 2);
    assert_eq!(snapshot.len(), 40);
    for (contract, entry) in snapshot.iter() {
        assert_eq!(entry.cycle, 2);
        assert_eq!(store.iv(contract), Some(entry.iv));
    }
}

#[tokio::test]
async fn same_seed_same_alerts() {
    let (mut a, _) = build(5.0, 99);
    let (mut b, _) = build(5.0, 99);

    for _ in 0..10 {
        let ra = a.run_cycle().await;
        let rb = b.run_cycle().await;
        let ka: Vec<(String, f64)> = ra
            .alerts
            .iter()
            .map(|x| (x.contract.key(), x.new_iv))
            .collect();
        let kb: Vec<(String, f64)> = rb
            .alerts
            .iter()
            .map(|x| (x.contract.key(), x.new_iv))
            .collect();
        assert_eq!(ka, kb);
    }
}

#[tokio::test(start_paused = true)]
async fn run_loop_end_to_end() {
    let (monitor, recording) = build(10.0, 3);
    let mut monitor = monitor.with_startup_test(true).with_max_cycles(Some(20));
    let handle = monitor.handle();
    let (_stop, shutdown) = tokio::sync::watch::channel(false);

    monitor.run(shutdown).await;

    assert!(!handle.is_running());
    assert_eq!(handle.health().status, "stopped");

    let stats = handle.get_stats();
    assert_eq!(stats.scheduler.cycles_run, 20);
    assert_eq!(stats.simulation.cycles_completed, 20);

    let messages = recording.messages();
    assert!(messages[..].iter().any(|m| m.contains("Test Notification")));
    assert_eq!(
        stats.notifications.messages_sent as usize,
        messages.len()
    );
}
