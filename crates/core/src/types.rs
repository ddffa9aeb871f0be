//! Data model shared by every arbwatch crate.
//!
//! The detection pipeline is the only writer of these records. The client
//! stores, diffs and displays them but never recomputes the pipeline's
//! stake figures or changes an opportunity's status.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// =============================================================================
// Opportunity Status
// =============================================================================

/// Server-authoritative lifecycle status of an opportunity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OpportunityStatus {
    /// Still open on both books.
    #[default]
    Active,
    /// The pipeline considers the window closed.
    Expired,
    /// Both legs have been placed.
    Executed,
}

impl OpportunityStatus {
    /// Returns the wire string.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Expired => "expired",
            Self::Executed => "executed",
        }
    }
}

impl std::fmt::Display for OpportunityStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// =============================================================================
// Arbitrage Opportunity
// =============================================================================

/// A two-way arbitrage across two bookmakers on the same event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArbitrageOpportunity {
    /// Stable identity across updates to the same market.
    pub id: String,
    pub event_id: String,
    pub sport: String,
    pub home_team: String,
    pub away_team: String,
    /// Bookmaker offering `home_odds`.
    pub bookmaker_home: String,
    /// Bookmaker offering `away_odds`.
    pub bookmaker_away: String,
    /// Decimal odds for the home side.
    pub home_odds: Decimal,
    /// Decimal odds for the away side.
    pub away_odds: Decimal,
    /// Guaranteed return as a percentage of `total_stake`.
    pub profit_percent: Decimal,
    pub home_stake: Decimal,
    pub away_stake: Decimal,
    pub total_stake: Decimal,
    pub expected_return: Decimal,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    #[serde(default)]
    pub status: OpportunityStatus,
}

/// Reasons an inbound opportunity record is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The identity field is blank.
    #[error("opportunity id is empty")]
    EmptyId,

    /// Decimal odds must be strictly greater than 1.
    #[error("{side} odds must be > 1, got {odds}")]
    OddsOutOfRange {
        /// Which leg failed.
        side: &'static str,
        /// The offending odds.
        odds: Decimal,
    },

    /// The expiry window is empty or inverted.
    #[error("expires_at {expires_at} is not after created_at {created_at}")]
    InvertedWindow {
        created_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    },
}

impl ArbitrageOpportunity {
    /// Checks the structural invariants the client relies on.
    ///
    /// Stake arithmetic is left to the pipeline and is not checked here.
    ///
    /// # Errors
    /// Returns the first violated invariant.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.id.trim().is_empty() {
            return Err(ValidationError::EmptyId);
        }
        if self.home_odds <= Decimal::ONE {
            return Err(ValidationError::OddsOutOfRange {
                side: "home",
                odds: self.home_odds,
            });
        }
        if self.away_odds <= Decimal::ONE {
            return Err(ValidationError::OddsOutOfRange {
                side: "away",
                odds: self.away_odds,
            });
        }
        if self.expires_at <= self.created_at {
            return Err(ValidationError::InvertedWindow {
                created_at: self.created_at,
                expires_at: self.expires_at,
            });
        }
        Ok(())
    }

    /// Short `home vs away` label.
    #[must_use]
    pub fn matchup(&self) -> String {
        format!("{} vs {}", self.home_team, self.away_team)
    }
}

// =============================================================================
// Feed Payloads
// =============================================================================

/// Raw odds observation from a single bookmaker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OddsUpdate {
    pub id: String,
    pub event_id: String,
    pub sport: String,
    pub home_team: String,
    pub away_team: String,
    pub bookmaker: String,
    pub home_odds: Decimal,
    pub away_odds: Decimal,
    /// Present only for three-way markets.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub draw_odds: Option<Decimal>,
    pub timestamp: DateTime<Utc>,
    /// moneyline, spread or total.
    pub market_type: String,
}

/// Pipeline health notice. Fields are optional because the pipeline
/// does not commit to a schema for these.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusUpdate {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Decoded payload of one inbound feed unit, keyed by the envelope `type`.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedMessage {
    Arbitrage(ArbitrageOpportunity),
    OddsUpdate(OddsUpdate),
    Status(StatusUpdate),
}

impl FeedMessage {
    /// The envelope discriminator this payload was decoded from.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Arbitrage(_) => "arbitrage",
            Self::OddsUpdate(_) => "odds_update",
            Self::Status(_) => "status",
        }
    }
}

/// A decoded feed unit together with its envelope timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    pub message: FeedMessage,
    /// Send time stamped by the pipeline, when present and parseable.
    pub timestamp: Option<DateTime<Utc>>,
}
