//! Derived, on-demand presentation data over a store snapshot.
//!
//! Nothing here is cached: every helper takes the snapshot and `now` it
//! should describe.

use arbwatch_arbitrage::{compute_stakes, CalcError, StakeAllocation};
use arbwatch_core::ArbitrageOpportunity;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::expiry::{bucket, format_remaining, ExpiryBucket};
use crate::notify::NotificationPolicy;

/// Which opportunities a board shows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpportunityFilter {
    #[default]
    All,
    HighProfit,
}

impl OpportunityFilter {
    #[must_use]
    pub fn apply<'a>(
        self,
        opportunities: &'a [ArbitrageOpportunity],
        policy: &NotificationPolicy,
    ) -> Vec<&'a ArbitrageOpportunity> {
        opportunities
            .iter()
            .filter(|o| match self {
                Self::All => true,
                Self::HighProfit => policy.is_high_profit(o),
            })
            .collect()
    }
}

/// Headline numbers for the board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardStats {
    pub total: usize,
    /// Mean `profit_percent`; zero for an empty board.
    pub average_profit: Decimal,
    pub high_profit: usize,
}

impl DashboardStats {
    #[must_use]
    pub fn compute(opportunities: &[ArbitrageOpportunity], policy: &NotificationPolicy) -> Self {
        let total = opportunities.len();
        let average_profit = if total == 0 {
            Decimal::ZERO
        } else {
            opportunities
                .iter()
                .map(|o| o.profit_percent)
                .sum::<Decimal>()
                / Decimal::from(total)
        };
        let high_profit = opportunities
            .iter()
            .filter(|o| policy.is_high_profit(o))
            .count();

        Self {
            total,
            average_profit,
            high_profit,
        }
    }
}

/// One row of the board at a given instant.
#[derive(Debug, Clone, PartialEq)]
pub struct OpportunityView<'a> {
    pub opportunity: &'a ArbitrageOpportunity,
    pub bucket: ExpiryBucket,
    pub remaining: String,
}

impl<'a> OpportunityView<'a> {
    #[must_use]
    pub fn new(opportunity: &'a ArbitrageOpportunity, now: DateTime<Utc>) -> Self {
        Self {
            opportunity,
            bucket: bucket(now, opportunity.expires_at),
            remaining: format_remaining(now, opportunity.expires_at),
        }
    }

    /// Views for every opportunity, in snapshot order.
    #[must_use]
    pub fn build(
        opportunities: impl IntoIterator<Item = &'a ArbitrageOpportunity>,
        now: DateTime<Utc>,
    ) -> Vec<Self> {
        opportunities
            .into_iter()
            .map(|o| Self::new(o, now))
            .collect()
    }
}

/// Stake split for staking `bankroll` on a stored opportunity.
///
/// # Errors
/// See [`compute_stakes`].
pub fn stakes_for(
    opportunity: &ArbitrageOpportunity,
    bankroll: Decimal,
) -> Result<StakeAllocation, CalcError> {
    compute_stakes(opportunity.home_odds, opportunity.away_odds, bankroll)
}
