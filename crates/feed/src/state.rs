//! Connection lifecycle state machine.
//!
//! ```text
//!                 open()                 transport ready
//! Disconnected ───────────► Connecting ──────────────────► Connected
//!      ▲  │                     │                              │
//!      │  │ timer fires         │ transport closed / error     │
//!      │  └───────────────► ◄───┴──────────────────────────────┘
//!      │                  Disconnected (+ one reconnect timer)
//!      │
//!      └── close(): cancels the timer, terminal until the next open()
//! ```
//!
//! The machine performs no I/O. Each input returns the [`Action`]s the
//! driver must carry out, in order. It tracks whether a reconnect timer is
//! outstanding so that at most one is ever requested.

use arbwatch_core::{BackoffKind, ConnectionState, FeedConfig};
use std::time::Duration;

/// How the delay before the next reconnect attempt is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backoff {
    /// Same interval every attempt.
    Fixed,
    /// Interval doubles per consecutive failure, capped at `max`.
    Exponential { max: Duration },
}

/// Reconnection policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectPolicy {
    pub interval: Duration,
    pub backoff: Backoff,
    /// Consecutive failed attempts after which reconnecting stops (0 = never).
    pub max_attempts: u32,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(3000),
            backoff: Backoff::Fixed,
            max_attempts: 0,
        }
    }
}

impl ReconnectPolicy {
    /// Builds the policy described by the feed configuration.
    #[must_use]
    pub fn from_config(config: &FeedConfig) -> Self {
        let backoff = match config.backoff {
            BackoffKind::Fixed => Backoff::Fixed,
            BackoffKind::Exponential => Backoff::Exponential {
                max: config.max_reconnect_interval(),
            },
        };
        Self {
            interval: config.reconnect_interval(),
            backoff,
            max_attempts: config.max_reconnect_attempts,
        }
    }

    /// Delay before retry number `attempt` (1-based).
    #[must_use]
    pub fn delay_for(&self, attempt: u32) -> Duration {
        match self.backoff {
            Backoff::Fixed => self.interval,
            Backoff::Exponential { max } => {
                let shift = attempt.saturating_sub(1).min(16);
                self.interval.saturating_mul(1 << shift).min(max)
            }
        }
    }
}

/// Side effects requested by the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Start a transport connection attempt.
    Connect,
    /// Tear down the transport (or abandon the in-flight attempt).
    Disconnect,
    /// Arm the single reconnect timer.
    ScheduleReconnect(Duration),
    /// Disarm the reconnect timer.
    CancelReconnect,
    /// Publish a state change.
    Emit(ConnectionState),
    /// Publish that the attempt cap was reached.
    Abandon { attempts: u32 },
}

#[derive(Debug, Clone)]
pub struct ConnectionStateMachine {
    state: ConnectionState,
    policy: ReconnectPolicy,
    /// Set by `close()`, cleared by `open()`.
    closed: bool,
    timer_pending: bool,
    /// Consecutive drops without a successful connection in between.
    failures: u32,
}

impl ConnectionStateMachine {
    #[must_use]
    pub fn new(policy: ReconnectPolicy) -> Self {
        Self {
            state: ConnectionState::Disconnected,
            policy,
            closed: true,
            timer_pending: false,
            failures: 0,
        }
    }

    #[must_use]
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    #[must_use]
    pub fn timer_pending(&self) -> bool {
        self.timer_pending
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// User request to connect. A no-op while already connecting or
    /// connected; from `Disconnected` it connects immediately, replacing
    /// any pending reconnect timer.
    pub fn open(&mut self) -> Vec<Action> {
        self.closed = false;
        if self.state != ConnectionState::Disconnected {
            return Vec::new();
        }

        let mut actions = Vec::with_capacity(3);
        if self.timer_pending {
            self.timer_pending = false;
            actions.push(Action::CancelReconnect);
        }
        self.failures = 0;
        self.state = ConnectionState::Connecting;
        actions.push(Action::Emit(ConnectionState::Connecting));
        actions.push(Action::Connect);
        actions
    }

    /// The transport finished its handshake.
    pub fn transport_ready(&mut self) -> Vec<Action> {
        if self.state != ConnectionState::Connecting {
            return Vec::new();
        }
        self.state = ConnectionState::Connected;
        self.failures = 0;
        vec![Action::Emit(ConnectionState::Connected)]
    }

    /// The transport closed, errored, or the connection attempt failed.
    pub fn transport_closed(&mut self) -> Vec<Action> {
        if self.state == ConnectionState::Disconnected {
            return Vec::new();
        }
        self.state = ConnectionState::Disconnected;
        let mut actions = vec![Action::Emit(ConnectionState::Disconnected)];

        if self.closed || self.timer_pending {
            return actions;
        }

        self.failures = self.failures.saturating_add(1);
        if self.policy.max_attempts > 0 && self.failures > self.policy.max_attempts {
            actions.push(Action::Abandon {
                attempts: self.failures - 1,
            });
            return actions;
        }

        self.timer_pending = true;
        actions.push(Action::ScheduleReconnect(
            self.policy.delay_for(self.failures),
        ));
        actions
    }

    /// The reconnect timer elapsed.
    pub fn reconnect_timer_fired(&mut self) -> Vec<Action> {
        if !self.timer_pending {
            return Vec::new();
        }
        self.timer_pending = false;
        if self.closed || self.state != ConnectionState::Disconnected {
            return Vec::new();
        }
        self.state = ConnectionState::Connecting;
        vec![Action::Emit(ConnectionState::Connecting), Action::Connect]
    }

    /// User request to disconnect. Cancels any pending reconnect and
    /// suppresses reconnection until the next `open()`.
    pub fn close(&mut self) -> Vec<Action> {
        self.closed = true;
        let mut actions = Vec::with_capacity(3);
        if self.timer_pending {
            self.timer_pending = false;
            actions.push(Action::CancelReconnect);
        }
        if self.state != ConnectionState::Disconnected {
            self.state = ConnectionState::Disconnected;
            actions.push(Action::Disconnect);
            actions.push(Action::Emit(ConnectionState::Disconnected));
        }
        actions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fsm() -> ConnectionStateMachine {
        ConnectionStateMachine::new(ReconnectPolicy::default())
    }

    fn connected() -> ConnectionStateMachine {
        let mut m = fsm();
        m.open();
        m.transport_ready();
        m
    }

    #[test]
    fn test_starts_disconnected_and_closed() {
        let m = fsm();
        assert_eq!(m.state(), ConnectionState::Disconnected);
        assert!(m.is_closed());
        assert!(!m.timer_pending());
    }

    #[test]
    fn test_open_then_ready() {
        let mut m = fsm();
        assert_eq!(
            m.open(),
            vec![Action::Emit(ConnectionState::Connecting), Action::Connect]
        );
        assert_eq!(
            m.transport_ready(),
            vec![Action::Emit(ConnectionState::Connected)]
        );
        assert_eq!(m.state(), ConnectionState::Connected);
    }

    #[test]
    fn test_open_while_connected_is_noop() {
        let mut m = connected();
        assert!(m.open().is_empty());
        assert_eq!(m.state(), ConnectionState::Connected);
    }

    #[test]
    fn test_drop_schedules_single_reconnect() {
        let mut m = connected();
        assert_eq!(
            m.transport_closed(),
            vec![
                Action::Emit(ConnectionState::Disconnected),
                Action::ScheduleReconnect(Duration::from_millis(3000)),
            ]
        );
        assert!(m.timer_pending());

        // A second close notification must not arm a second timer.
        assert!(m.transport_closed().is_empty());
        assert!(m.timer_pending());
    }

    #[test]
    fn test_failed_attempt_reschedules() {
        let mut m = connected();
        m.transport_closed();
        assert_eq!(
            m.reconnect_timer_fired(),
            vec![Action::Emit(ConnectionState::Connecting), Action::Connect]
        );
        assert!(!m.timer_pending());

        let actions = m.transport_closed();
        assert!(actions.contains(&Action::ScheduleReconnect(Duration::from_millis(3000))));
        assert!(m.timer_pending());
    }

    #[test]
    fn test_close_cancels_pending_timer() {
        let mut m = connected();
        m.transport_closed();
        assert!(m.timer_pending());

        assert_eq!(m.close(), vec![Action::CancelReconnect]);
        assert!(!m.timer_pending());

        // A stale timer callback after close does nothing.
        assert!(m.reconnect_timer_fired().is_empty());
        assert_eq!(m.state(), ConnectionState::Disconnected);
    }

    #[test]
    fn test_close_while_connected_suppresses_reconnect() {
        let mut m = connected();
        assert_eq!(
            m.close(),
            vec![
                Action::Disconnect,
                Action::Emit(ConnectionState::Disconnected)
            ]
        );
        // Transport teardown notification arrives after close.
        assert!(m.transport_closed().is_empty());
        assert!(!m.timer_pending());
    }

    #[test]
    fn test_close_while_connecting_abandons_attempt() {
        let mut m = fsm();
        m.open();
        let actions = m.close();
        assert!(actions.contains(&Action::Disconnect));
        assert!(m.transport_ready().is_empty());
        assert_eq!(m.state(), ConnectionState::Disconnected);
    }

    #[test]
    fn test_open_after_close_reconnects_immediately() {
        let mut m = connected();
        m.transport_closed();
        m.close();
        assert_eq!(
            m.open(),
            vec![Action::Emit(ConnectionState::Connecting), Action::Connect]
        );
    }

    #[test]
    fn test_open_replaces_pending_timer() {
        let mut m = connected();
        m.transport_closed();
        assert_eq!(
            m.open(),
            vec![
                Action::CancelReconnect,
                Action::Emit(ConnectionState::Connecting),
                Action::Connect
            ]
        );
        assert!(!m.timer_pending());
    }

    #[test]
    fn test_never_two_timers_over_random_walk() {
        let mut m = fsm();
        let mut armed = 0i32;
        // Deterministic pseudo-random sequence of inputs.
        let mut seed: u32 = 0x2545_f491;
        for _ in 0..10_000 {
            seed ^= seed << 13;
            seed ^= seed >> 17;
            seed ^= seed << 5;
            let actions = match seed % 5 {
                0 => m.open(),
                1 => m.transport_ready(),
                2 => m.transport_closed(),
                3 => m.reconnect_timer_fired(),
                _ => m.close(),
            };
            let fired = seed % 5 == 3;
            for action in &actions {
                match action {
                    Action::ScheduleReconnect(_) => armed += 1,
                    Action::CancelReconnect => armed -= 1,
                    _ => {}
                }
            }
            if fired && armed == 1 && !m.timer_pending() {
                armed = 0;
            }
            assert!((0..=1).contains(&armed), "armed timers: {armed}");
            assert_eq!(armed == 1, m.timer_pending());
            if m.is_closed() {
                assert!(!m.timer_pending());
            }
        }
    }

    #[test]
    fn test_attempt_cap_abandons() {
        let mut m = ConnectionStateMachine::new(ReconnectPolicy {
            max_attempts: 2,
            ..ReconnectPolicy::default()
        });
        m.open();
        m.transport_closed(); // failure 1 -> retry
        m.reconnect_timer_fired();
        m.transport_closed(); // failure 2 -> retry
        m.reconnect_timer_fired();
        let actions = m.transport_closed(); // failure 3 -> give up
        assert!(actions.contains(&Action::Abandon { attempts: 2 }));
        assert!(!m.timer_pending());
        assert!(m.reconnect_timer_fired().is_empty());
    }

    #[test]
    fn test_successful_connection_resets_failures() {
        let mut m = ConnectionStateMachine::new(ReconnectPolicy {
            max_attempts: 1,
            ..ReconnectPolicy::default()
        });
        m.open();
        m.transport_ready();
        for _ in 0..5 {
            let actions = m.transport_closed();
            assert!(matches!(actions[1], Action::ScheduleReconnect(_)));
            m.reconnect_timer_fired();
            m.transport_ready();
        }
    }

    #[test]
    fn test_fixed_backoff_delay() {
        let policy = ReconnectPolicy::default();
        assert_eq!(policy.delay_for(1), Duration::from_secs(3));
        assert_eq!(policy.delay_for(10), Duration::from_secs(3));
    }

    #[test]
    fn test_exponential_backoff_delay() {
        let policy = ReconnectPolicy {
            interval: Duration::from_secs(1),
            backoff: Backoff::Exponential {
                max: Duration::from_secs(30),
            },
            max_attempts: 0,
        };
        assert_eq!(policy.delay_for(1), Duration::from_secs(1));
        assert_eq!(policy.delay_for(2), Duration::from_secs(2));
        assert_eq!(policy.delay_for(4), Duration::from_secs(8));
        assert_eq!(policy.delay_for(6), Duration::from_secs(30));
        assert_eq!(policy.delay_for(u32::MAX), Duration::from_secs(30));
    }

    #[test]
    fn test_policy_from_config() {
        let config = FeedConfig {
            backoff: BackoffKind::Exponential,
            max_reconnect_attempts: 7,
            ..FeedConfig::default()
        };
        let policy = ReconnectPolicy::from_config(&config);
        assert_eq!(policy.interval, Duration::from_secs(3));
        assert_eq!(
            policy.backoff,
            Backoff::Exponential {
                max: Duration::from_secs(60)
            }
        );
        assert_eq!(policy.max_attempts, 7);
    }
}
