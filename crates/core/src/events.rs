use crate::types::Envelope;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Connectivity of the feed channel. Owned by the connection manager and
/// observed elsewhere only through [`FeedEvent::StateChanged`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

impl ConnectionState {
    /// Coarse indicator label shown to the user.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Disconnected => "Disconnected",
            Self::Connecting => "Connecting...",
            Self::Connected => "Live",
        }
    }
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Events emitted by the connection manager, in transport order.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedEvent {
    /// The connection state machine moved to a new state.
    StateChanged(ConnectionState),
    /// A well-formed inbound unit.
    Message(Envelope),
    /// The reconnect policy's attempt cap was reached; no timer is pending.
    ReconnectAbandoned { attempts: u32 },
}

/// Urgency tier assigned to a newly-seen opportunity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AlertTier {
    HighProfit,
    Standard,
}

/// What the external notifier should show. How it is rendered or played
/// is the notifier's business.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertIntent {
    pub tier: AlertTier,
    pub message: String,
    pub opportunity_id: String,
    /// How long the notice should stay on screen.
    pub display_for: Duration,
    /// Whether a sound cue accompanies the notice.
    pub audible: bool,
}
