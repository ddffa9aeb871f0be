//! Countdown buckets for opportunity expiry.
//!
//! Bucketing is a pure function of `now` and `expires_at`; nothing here
//! mutates stored opportunities. A [`CountdownTicker`] publishes a fresh
//! `now` once a second so views can re-evaluate.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Remaining time at or below which an opportunity is `Imminent`.
pub const IMMINENT_WINDOW: Duration = Duration::from_secs(60);

/// Countdown tick period.
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpiryBucket {
    Active,
    Imminent,
    Expired,
}

impl ExpiryBucket {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Imminent => "imminent",
            Self::Expired => "expired",
        }
    }
}

/// Classifies the time left before `expires_at`.
#[must_use]
pub fn bucket(now: DateTime<Utc>, expires_at: DateTime<Utc>) -> ExpiryBucket {
    match (expires_at - now).to_std() {
        Ok(remaining) if remaining.is_zero() => ExpiryBucket::Expired,
        Ok(remaining) if remaining <= IMMINENT_WINDOW => ExpiryBucket::Imminent,
        Ok(_) => ExpiryBucket::Active,
        Err(_) => ExpiryBucket::Expired,
    }
}

/// Countdown text: `m:ss` with whole seconds truncated, or `Expired`.
#[must_use]
pub fn format_remaining(now: DateTime<Utc>, expires_at: DateTime<Utc>) -> String {
    let millis = (expires_at - now).num_milliseconds();
    if millis <= 0 {
        return "Expired".to_string();
    }
    let minutes = millis / 60_000;
    let seconds = (millis % 60_000) / 1000;
    format!("{minutes}:{seconds:02}")
}

/// Shared 1 Hz clock. Dropping the ticker stops its task.
#[derive(Debug)]
pub struct CountdownTicker {
    now: watch::Receiver<DateTime<Utc>>,
    task: JoinHandle<()>,
}

impl CountdownTicker {
    /// Starts ticking every [`TICK_PERIOD`]. Must be called inside a tokio
    /// runtime.
    #[must_use]
    pub fn spawn() -> Self {
        Self::with_period(TICK_PERIOD)
    }

    #[must_use]
    pub fn with_period(period: Duration) -> Self {
        let (tx, rx) = watch::channel(Utc::now());
        let task = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            // First tick completes immediately.
            interval.tick().await;
            loop {
                interval.tick().await;
                if tx.send(Utc::now()).is_err() {
                    break;
                }
            }
        });
        Self { now: rx, task }
    }

    /// Receiver that changes on every tick.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<DateTime<Utc>> {
        self.now.clone()
    }

    /// Time of the latest tick.
    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        *self.now.borrow()
    }
}

impl Drop for CountdownTicker {
    fn drop(&mut self) {
        self.task.abort();
    }
}
