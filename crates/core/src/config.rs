use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub feed: FeedConfig,
    #[serde(default)]
    pub snapshot: SnapshotConfig,
    #[serde(default)]
    pub alerts: AlertConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub calculator: CalculatorConfig,
}

/// Backoff shape between reconnect attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BackoffKind {
    /// Same delay every time.
    #[default]
    Fixed,
    /// Delay doubles per attempt up to `max_reconnect_interval_ms`.
    Exponential,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedConfig {
    #[serde(default = "default_ws_url")]
    pub ws_url: String,
    #[serde(default = "default_reconnect_interval_ms")]
    pub reconnect_interval_ms: u64,
    #[serde(default)]
    pub backoff: BackoffKind,
    #[serde(default = "default_max_reconnect_interval_ms")]
    pub max_reconnect_interval_ms: u64,
    /// 0 = unlimited.
    #[serde(default)]
    pub max_reconnect_attempts: u32,
    #[serde(default = "default_ping_interval_secs")]
    pub ping_interval_secs: u64,
    #[serde(default = "default_channel_buffer_size")]
    pub channel_buffer_size: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotConfig {
    #[serde(default = "default_snapshot_url")]
    pub base_url: String,
    #[serde(default = "default_snapshot_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertConfig {
    /// Profit percentage at or above which an alert is `HighProfit`.
    #[serde(default = "default_high_profit_threshold")]
    pub high_profit_threshold: Decimal,
    #[serde(default = "default_high_profit_display_ms")]
    pub high_profit_display_ms: u64,
    #[serde(default = "default_standard_display_ms")]
    pub standard_display_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_capacity")]
    pub capacity: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculatorConfig {
    #[serde(default = "default_bankroll")]
    pub default_bankroll: Decimal,
    /// Allowed absolute gap, in percentage points, between the pipeline's
    /// profit figure and a local recomputation.
    #[serde(default = "default_consistency_tolerance")]
    pub consistency_tolerance: Decimal,
}

fn default_ws_url() -> String {
    "ws://localhost:8080/ws".to_string()
}

const fn default_reconnect_interval_ms() -> u64 {
    3000
}

const fn default_max_reconnect_interval_ms() -> u64 {
    60_000
}

const fn default_ping_interval_secs() -> u64 {
    30
}

const fn default_channel_buffer_size() -> usize {
    1000
}

fn default_snapshot_url() -> String {
    "http://localhost:8080".to_string()
}

const fn default_snapshot_timeout_secs() -> u64 {
    10
}

fn default_high_profit_threshold() -> Decimal {
    Decimal::TWO
}

const fn default_high_profit_display_ms() -> u64 {
    10_000
}

const fn default_standard_display_ms() -> u64 {
    5_000
}

const fn default_capacity() -> usize {
    50
}

fn default_bankroll() -> Decimal {
    Decimal::from(1000)
}

fn default_consistency_tolerance() -> Decimal {
    Decimal::new(5, 2) // 0.05 percentage points
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            ws_url: default_ws_url(),
            reconnect_interval_ms: default_reconnect_interval_ms(),
            backoff: BackoffKind::default(),
            max_reconnect_interval_ms: default_max_reconnect_interval_ms(),
            max_reconnect_attempts: 0,
            ping_interval_secs: default_ping_interval_secs(),
            channel_buffer_size: default_channel_buffer_size(),
        }
    }
}

impl FeedConfig {
    #[must_use]
    pub const fn reconnect_interval(&self) -> Duration {
        Duration::from_millis(self.reconnect_interval_ms)
    }

    #[must_use]
    pub const fn max_reconnect_interval(&self) -> Duration {
        Duration::from_millis(self.max_reconnect_interval_ms)
    }

    #[must_use]
    pub const fn ping_interval(&self) -> Duration {
        Duration::from_secs(self.ping_interval_secs)
    }
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            base_url: default_snapshot_url(),
            timeout_secs: default_snapshot_timeout_secs(),
        }
    }
}

impl SnapshotConfig {
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            high_profit_threshold: default_high_profit_threshold(),
            high_profit_display_ms: default_high_profit_display_ms(),
            standard_display_ms: default_standard_display_ms(),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            capacity: default_capacity(),
        }
    }
}

impl Default for CalculatorConfig {
    fn default() -> Self {
        Self {
            default_bankroll: default_bankroll(),
            consistency_tolerance: default_consistency_tolerance(),
        }
    }
}
