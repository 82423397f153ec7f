//! Sync engine configuration.

use rust_decimal::Decimal;
use std::time::Duration;

/// Debounce window collapsing bursts of local writes into one push.
pub const DEFAULT_PUSH_DEBOUNCE_MS: u64 = 1_000;

/// Delay between startup and the capability probe.
pub const DEFAULT_PROBE_DELAY_MS: u64 = 3_000;

/// Rows per remote insert request.
pub const PUSH_BATCH_SIZE: usize = 500;

#[derive(Debug, Clone, PartialEq)]
pub struct SyncConfig {
    pub enabled: bool,
    pub debounce: Duration,
    pub probe_delay: Duration,
    /// Tolerance for the PnL-sum comparison of the staleness check.
    pub pnl_epsilon: Decimal,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            debounce: Duration::from_millis(DEFAULT_PUSH_DEBOUNCE_MS),
            probe_delay: Duration::from_millis(DEFAULT_PROBE_DELAY_MS),
            pnl_epsilon: Decimal::new(1, 2),
        }
    }
}

impl SyncConfig {
    /// Defaults overridden by `TRADEJOURNAL_SYNC_ENABLED`,
    /// `TRADEJOURNAL_SYNC_DEBOUNCE_MS` and `TRADEJOURNAL_PROBE_DELAY_MS`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(value) = lookup("TRADEJOURNAL_SYNC_ENABLED") {
            match value.trim().to_ascii_lowercase().as_str() {
                "0" | "false" | "off" | "no" => config.enabled = false,
                "1" | "true" | "on" | "yes" => config.enabled = true,
                other => log::warn!("[Sync] Ignoring invalid TRADEJOURNAL_SYNC_ENABLED '{}'", other),
            }
        }
        if let Some(ms) = parse_millis(lookup("TRADEJOURNAL_SYNC_DEBOUNCE_MS")) {
            config.debounce = ms;
        }
        if let Some(ms) = parse_millis(lookup("TRADEJOURNAL_PROBE_DELAY_MS")) {
            config.probe_delay = ms;
        }
        config
    }

    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    pub fn with_probe_delay(mut self, probe_delay: Duration) -> Self {
        self.probe_delay = probe_delay;
        self
    }

    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }
}

fn parse_millis(value: Option<String>) -> Option<Duration> {
    let value = value?;
    match value.trim().parse::<u64>() {
        Ok(ms) => Some(Duration::from_millis(ms)),
        Err(_) => {
            log::warn!("[Sync] Ignoring invalid duration '{}'", value);
            None
        }
    }
}
