//! Session controller: single owner of the opportunity store.
//!
//! All mutation happens on the task that drives [`Session::run`] (or calls
//! [`Session::handle_event`] directly). Every arbitrage message is applied as
//! upsert, then a diff of the snapshots taken before and after, then alert
//! decisions for the ids the diff reports as new.

use std::sync::Arc;

use arbwatch_arbitrage::check_consistency;
use arbwatch_core::{
    AlertIntent, AlertSink, AppConfig, ArbitrageOpportunity, ConnectionState, FeedEvent,
    FeedMessage, SnapshotSource,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::expiry::CountdownTicker;
use crate::notify::NotificationPolicy;
use crate::store::{snapshot_diff, OpportunitySet};

/// Owns the store, the alert policy and the last observed connection state.
#[derive(Debug, Clone)]
pub struct Session {
    store: OpportunitySet,
    policy: NotificationPolicy,
    connection: ConnectionState,
    consistency_tolerance: Decimal,
}

impl Session {
    #[must_use]
    pub fn new(
        store: OpportunitySet,
        policy: NotificationPolicy,
        consistency_tolerance: Decimal,
    ) -> Self {
        Self {
            store,
            policy,
            connection: ConnectionState::Disconnected,
            consistency_tolerance,
        }
    }

    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            OpportunitySet::new(config.store.capacity),
            NotificationPolicy::from_config(&config.alerts),
            config.calculator.consistency_tolerance,
        )
    }

    #[must_use]
    pub fn store(&self) -> &OpportunitySet {
        &self.store
    }

    #[must_use]
    pub fn policy(&self) -> &NotificationPolicy {
        &self.policy
    }

    #[must_use]
    pub fn connection_state(&self) -> ConnectionState {
        self.connection
    }

    #[must_use]
    pub fn snapshot(&self) -> Arc<[ArbitrageOpportunity]> {
        self.store.snapshot()
    }

    /// Loads the initial snapshot. Seeded entries never alert.
    ///
    /// On failure the error is logged and the store is left as it was.
    /// Returns the number of entries now in the store.
    pub async fn seed(&mut self, source: &dyn SnapshotSource) -> usize {
        match source.fetch_snapshot().await {
            Ok(opportunities) => {
                let received = opportunities.len();
                self.store.initialize_from(opportunities);
                info!(received, stored = self.store.len(), "Seeded opportunity store");
            }
            Err(e) => {
                warn!(error = %e, "Snapshot fetch failed, starting with an empty board");
            }
        }
        self.store.len()
    }

    /// Applies one feed event and returns the alerts it produces.
    pub fn handle_event(&mut self, event: FeedEvent) -> Vec<AlertIntent> {
        match event {
            FeedEvent::StateChanged(state) => {
                if state != self.connection {
                    info!(from = %self.connection, to = %state, "Connection state changed");
                }
                self.connection = state;
                Vec::new()
            }
            FeedEvent::Message(envelope) => match envelope.message {
                FeedMessage::Arbitrage(opportunity) => self.apply_opportunity(opportunity),
                FeedMessage::OddsUpdate(update) => {
                    debug!(
                        event_id = %update.event_id,
                        bookmaker = %update.bookmaker,
                        "Odds update received"
                    );
                    Vec::new()
                }
                FeedMessage::Status(status) => {
                    info!(status = ?status.status, message = ?status.message, "Feed status");
                    Vec::new()
                }
            },
            FeedEvent::ReconnectAbandoned { attempts } => {
                error!(attempts, "Feed gave up reconnecting; board is no longer live");
                Vec::new()
            }
        }
    }

    /// Upserts one opportunity and alerts if its id was not on the board.
    pub fn apply_opportunity(&mut self, opportunity: ArbitrageOpportunity) -> Vec<AlertIntent> {
        self.audit(&opportunity);

        let previous = self.store.snapshot();
        self.store.upsert(opportunity);
        let current = self.store.snapshot();

        let newly_seen = snapshot_diff(&previous, &current);
        debug!(
            stored = current.len(),
            new = newly_seen.len(),
            "Applied arbitrage update"
        );
        self.policy.intents(newly_seen)
    }

    fn audit(&self, opportunity: &ArbitrageOpportunity) {
        match check_consistency(opportunity, self.consistency_tolerance) {
            Ok(report) if !report.consistent => warn!(
                id = %opportunity.id,
                reported_profit = %opportunity.profit_percent,
                recomputed_profit = %report.recomputed.profit_percent.round_dp(4),
                stake_gap = %report.stake_gap,
                total_gap = %report.total_gap,
                "Pipeline figures disagree with local recomputation"
            ),
            Ok(_) => {}
            Err(e) => warn!(id = %opportunity.id, error = %e, "Cannot verify opportunity figures"),
        }
    }

    /// Drives the session until the feed event channel closes.
    ///
    /// Alerts go to `sink` in diff order; a sink failure is logged and does
    /// not stop the loop. `on_tick` runs on every countdown tick with the
    /// tick's time and only reads the session.
    pub async fn run<F>(
        &mut self,
        mut events: mpsc::Receiver<FeedEvent>,
        sink: &dyn AlertSink,
        ticker: &CountdownTicker,
        mut on_tick: F,
    ) where
        F: FnMut(&Session, DateTime<Utc>),
    {
        enum Wake {
            Event(Option<FeedEvent>),
            Tick(bool),
        }

        let mut clock = ticker.subscribe();
        let mut ticking = true;

        loop {
            let wake = tokio::select! {
                event = events.recv() => Wake::Event(event),
                changed = clock.changed(), if ticking => Wake::Tick(changed.is_ok()),
            };

            match wake {
                Wake::Event(Some(event)) => {
                    for intent in self.handle_event(event) {
                        if let Err(e) = sink.deliver(&intent).await {
                            warn!(id = %intent.opportunity_id, error = %e, "Alert delivery failed");
                        }
                    }
                }
                Wake::Event(None) => {
                    info!("Feed event channel closed, session ending");
                    break;
                }
                Wake::Tick(true) => {
                    let now = *clock.borrow_and_update();
                    on_tick(self, now);
                }
                Wake::Tick(false) => {
                    debug!("Countdown ticker stopped");
                    ticking = false;
                }
            }
        }
    }
}
