//! Application configuration
//!
//! Layers, later wins:
//! 1. built-in defaults
//! 2. optional TOML file
//! 3. environment (`IV_SPIKE_THRESHOLD`, `SCAN_INTERVAL`, `TELEGRAM_BOT_TOKEN`,
//!    `TELEGRAM_CHAT_ID`, `LOG_LEVEL`)
//! 4. command-line flags, applied by the binary

use std::fs;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::{SpikeError, SpikeResult};
use crate::data::FeedConfig;
use crate::notify::NotifyConfig;
use crate::spikes::SpikeConfig;

pub const ENV_THRESHOLD: &str = "IV_SPIKE_THRESHOLD";
pub const ENV_SCAN_INTERVAL: &str = "SCAN_INTERVAL";
pub const ENV_TELEGRAM_BOT_TOKEN: &str = "TELEGRAM_BOT_TOKEN";
pub const ENV_TELEGRAM_CHAT_ID: &str = "TELEGRAM_CHAT_ID";
pub const ENV_LOG_LEVEL: &str = "LOG_LEVEL";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Seconds between cycle starts
    /// Default: 1
    pub interval_secs: u64,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self { interval_secs: 1 }
    }
}

impl ScanConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub scan: ScanConfig,
    pub detector: SpikeConfig,
    pub feed: FeedConfig,
    pub notify: NotifyConfig,
    /// Default: "info"
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            scan: ScanConfig::default(),
            detector: SpikeConfig::default(),
            feed: FeedConfig::default(),
            notify: NotifyConfig::default(),
            log_level: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Defaults, then `path` if given, then the process environment
    pub fn load(path: Option<&Path>) -> SpikeResult<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> SpikeResult<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> SpikeResult<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Apply environment overrides read through `lookup`
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> SpikeResult<()> {
        if let Some(value) = lookup(ENV_THRESHOLD) {
            self.detector.threshold_percent = parse_env(ENV_THRESHOLD, &value)?;
        }
        if let Some(value) = lookup(ENV_SCAN_INTERVAL) {
            self.scan.interval_secs = parse_env(ENV_SCAN_INTERVAL, &value)?;
        }
        if let Some(value) = lookup(ENV_TELEGRAM_BOT_TOKEN) {
            self.notify.telegram.bot_token = value;
        }
        if let Some(value) = lookup(ENV_TELEGRAM_CHAT_ID) {
            self.notify.telegram.chat_id = value;
        }
        if let Some(value) = lookup(ENV_LOG_LEVEL) {
            self.log_level = value.trim().to_lowercase();
        }
        Ok(())
    }

    pub fn validate(&self) -> SpikeResult<()> {
        if self.scan.interval_secs == 0 {
            return Err(SpikeError::config("scan interval must be at least 1 second"));
        }
        self.detector.validate()?;
        self.feed.validate()?;
        self.notify.validate()
    }

    pub fn to_toml_string(&self) -> SpikeResult<String> {
        toml::to_string_pretty(self).map_err(|e| SpikeError::Serialization(e.to_string()))
    }
}

fn parse_env<T: FromStr>(key: &str, value: &str) -> SpikeResult<T> {
    value
        .trim()
        .parse()
        .map_err(|_| SpikeError::config(format!("{} has invalid value {:?}", key, value)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spikes::VolatilitySource;
    use std::collections::HashMap;
    use std::io::Write;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.scan.interval_secs, 1);
        assert_eq!(config.detector.threshold_percent, 10.0);
        assert_eq!(config.feed.symbols.len(), 8);
        assert_eq!(config.log_level, "info");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml() {
        let config = AppConfig::from_toml_str(
            r#"
            log_level = "debug"

            [scan]
            interval_secs = 5

            [detector]
            threshold_percent = 15.0

            [detector.delta_filter]
            enabled = true
            volatility_source = "implied_from_price"
            spots = { NIFTY = 22000.0 }

            [feed]
            expiries = ["2025-06-12", "2025-06-19"]
            seed = 7

            [[feed.symbols]]
            name = "NIFTY"
            base_iv = 20.0
            strikes = { start = 21000, end = 23000, step = 50 }

            [notify]
            send_timeout_secs = 3
            "#,
        )
        .unwrap();

        assert_eq!(config.log_level, "debug");
        assert_eq!(config.scan.interval(), Duration::from_secs(5));
        assert_eq!(config.detector.threshold_percent, 15.0);
        assert_eq!(config.detector.history_capacity, 100);
        assert!(config.detector.delta_filter.enabled);
        assert_eq!(
            config.detector.delta_filter.volatility_source,
            VolatilitySource::ImpliedFromPrice
        );
        assert_eq!(config.detector.delta_filter.spots["NIFTY"], 22000.0);
        assert_eq!(config.feed.symbols.len(), 1);
        assert_eq!(config.feed.seed, Some(7));
        assert_eq!(config.feed.strikes_per_cycle, 10);
        assert_eq!(config.notify.send_timeout_secs, 3);
        assert!(config.notify.console);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_overrides() {
        let mut config = AppConfig::default();
        config
            .apply_env(env(&[
                (ENV_THRESHOLD, "12.5"),
                (ENV_SCAN_INTERVAL, " 30 "),
                (ENV_TELEGRAM_BOT_TOKEN, "abc:def"),
                (ENV_TELEGRAM_CHAT_ID, "42"),
                (ENV_LOG_LEVEL, "WARN"),
            ]))
            .unwrap();

        assert_eq!(config.detector.threshold_percent, 12.5);
        assert_eq!(config.scan.interval_secs, 30);
        assert!(config.notify.telegram.is_configured());
        assert_eq!(config.log_level, "warn");
    }

    #[test]
    fn test_bad_env_value() {
        let mut config = AppConfig::default();
        let err = config.apply_env(env(&[(ENV_SCAN_INTERVAL, "soon")])).unwrap_err();
        assert!(matches!(err, SpikeError::Config(_)));
    }

    #[test]
    fn test_validate_rejects() {
        let mut config = AppConfig::default();
        config.scan.interval_secs = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.detector.threshold_percent = -1.0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.feed.expiries.clear();
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.feed.symbols[0].base_iv = Some(0.0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[detector]\nthreshold_percent = 7.5").unwrap();

        let config = AppConfig::from_file(file.path()).unwrap();
        assert_eq!(config.detector.threshold_percent, 7.5);

        let missing = AppConfig::from_file(Path::new("/nonexistent/iv_spike.toml"));
        assert!(matches!(missing, Err(SpikeError::IO(_))));

        writeln!(file, "[scan\n").unwrap();
        let broken = AppConfig::from_file(file.path());
        assert!(matches!(broken, Err(SpikeError::Serialization(_))));
    }

    #[test]
    fn test_toml_roundtrip_of_defaults() {
        let config = AppConfig::default();
        let text = config.to_toml_string().unwrap();
        assert_eq!(AppConfig::from_toml_str(&text).unwrap(), config);
    }
}
