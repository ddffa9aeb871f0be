//! Cross-check of pipeline-delivered figures against a local recomputation.
//!
//! Opportunities arrive with `profit_percent` and stakes already computed by
//! the detection pipeline. The client never overwrites those, but it can
//! verify them: recompute the split for the opportunity's own `total_stake`
//! and report how far the two disagree.

use arbwatch_core::ArbitrageOpportunity;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::calculator::{allocate, CalcError, StakeAllocation};

/// Largest stake deviation tolerated as currency rounding.
pub const STAKE_TOLERANCE: Decimal = dec!(0.01);

/// Outcome of a consistency check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsistencyReport {
    pub recomputed: StakeAllocation,
    /// |pipeline profit% - recomputed profit%| in percentage points.
    pub profit_gap: Decimal,
    /// Largest absolute difference across the two stakes.
    pub stake_gap: Decimal,
    /// |home_stake + away_stake - total_stake| as delivered.
    pub total_gap: Decimal,
    /// True when every gap is within its tolerance.
    pub consistent: bool,
}

/// Recomputes an opportunity's split and compares it with what the
/// pipeline delivered.
///
/// # Errors
/// Returns [`CalcError::InvalidInput`] if the opportunity's odds or
/// `total_stake` are outside the calculator's domain.
pub fn check_consistency(
    opportunity: &ArbitrageOpportunity,
    profit_tolerance: Decimal,
) -> Result<ConsistencyReport, CalcError> {
    let recomputed = allocate(
        opportunity.home_odds,
        opportunity.away_odds,
        opportunity.total_stake,
    )?;

    let profit_gap = (opportunity.profit_percent - recomputed.profit_percent).abs();
    let stake_gap = (opportunity.home_stake - recomputed.stake_home)
        .abs()
        .max((opportunity.away_stake - recomputed.stake_away).abs());
    let total_gap =
        (opportunity.home_stake + opportunity.away_stake - opportunity.total_stake).abs();

    let consistent = recomputed.is_arbitrage()
        && profit_gap <= profit_tolerance
        && stake_gap <= STAKE_TOLERANCE
        && total_gap <= STAKE_TOLERANCE;

    Ok(ConsistencyReport {
        recomputed,
        profit_gap,
        stake_gap,
        total_gap,
        consistent,
    })
}
