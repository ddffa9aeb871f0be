//! Stake allocation for a two-way arbitrage.
//!
//! Given decimal odds on both outcomes and a bankroll, the bankroll is split
//! in proportion to each side's implied probability so that either result
//! pays out the same amount:
//!
//! ```text
//! implied_home  = 1 / home_odds
//! implied_away  = 1 / away_odds
//! total_implied = implied_home + implied_away        (< 1 for a true arbitrage)
//!
//! stake_home     = bankroll * implied_home / total_implied
//! stake_away     = bankroll * implied_away / total_implied
//! profit_percent = (1 / total_implied - 1) * 100
//! ```
//!
//! All arithmetic is done in [`Decimal`] so that `stake_home + stake_away`
//! reproduces the bankroll to well below a cent.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Decimal places used for currency amounts.
pub const CURRENCY_DP: u32 = 2;

/// Errors from the arbitrage calculator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CalcError {
    /// Odds or bankroll outside their valid domain. Nothing was computed.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Inputs were valid but the implied probabilities sum to 1 or more,
    /// so no guaranteed profit exists.
    #[error("no arbitrage: implied probabilities sum to {total_implied}")]
    NoArbitrage {
        /// Sum of implied probabilities.
        total_implied: Decimal,
    },
}

/// Result of splitting a bankroll across both sides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakeAllocation {
    pub implied_home: Decimal,
    pub implied_away: Decimal,
    pub total_implied: Decimal,
    pub stake_home: Decimal,
    pub stake_away: Decimal,
    /// Guaranteed return as a percentage of the bankroll.
    pub profit_percent: Decimal,
    pub expected_return: Decimal,
    pub net_profit: Decimal,
}

impl StakeAllocation {
    /// True when the implied probabilities leave room for a guaranteed profit.
    #[must_use]
    pub fn is_arbitrage(&self) -> bool {
        self.total_implied < Decimal::ONE
    }

    /// Bankroll actually staked.
    #[must_use]
    pub fn total_stake(&self) -> Decimal {
        self.stake_home + self.stake_away
    }

    /// Copy with every currency amount rounded to cents and the profit
    /// percentage to two decimal places.
    #[must_use]
    pub fn rounded(&self) -> Self {
        Self {
            stake_home: self.stake_home.round_dp(CURRENCY_DP),
            stake_away: self.stake_away.round_dp(CURRENCY_DP),
            profit_percent: self.profit_percent.round_dp(2),
            expected_return: self.expected_return.round_dp(CURRENCY_DP),
            net_profit: self.net_profit.round_dp(CURRENCY_DP),
            ..self.clone()
        }
    }
}

/// Implied probability of decimal odds.
///
/// # Errors
/// Returns [`CalcError::InvalidInput`] unless `odds > 1`.
pub fn implied_probability(odds: Decimal) -> Result<Decimal, CalcError> {
    if odds <= Decimal::ONE {
        return Err(CalcError::InvalidInput(format!(
            "decimal odds must be > 1, got {odds}"
        )));
    }
    Ok(Decimal::ONE / odds)
}

/// Splits `bankroll` proportionally without judging whether the split is
/// profitable. Use [`compute_stakes`] when a guaranteed profit is required.
///
/// # Errors
/// Returns [`CalcError::InvalidInput`] if either odds is `<= 1` or the
/// bankroll is not positive.
pub fn allocate(
    home_odds: Decimal,
    away_odds: Decimal,
    bankroll: Decimal,
) -> Result<StakeAllocation, CalcError> {
    if bankroll <= Decimal::ZERO {
        return Err(CalcError::InvalidInput(format!(
            "bankroll must be > 0, got {bankroll}"
        )));
    }

    let implied_home = implied_probability(home_odds)?;
    let implied_away = implied_probability(away_odds)?;
    let total_implied = implied_home + implied_away;

    let stake_home = bankroll * implied_home / total_implied;
    let stake_away = bankroll * implied_away / total_implied;
    let profit_percent = (Decimal::ONE / total_implied - Decimal::ONE) * dec!(100);
    let expected_return = bankroll * (Decimal::ONE + profit_percent / dec!(100));

    Ok(StakeAllocation {
        implied_home,
        implied_away,
        total_implied,
        stake_home,
        stake_away,
        profit_percent,
        expected_return,
        net_profit: expected_return - bankroll,
    })
}

/// Computes stakes and guaranteed profit for a two-way arbitrage.
///
/// # Errors
/// - [`CalcError::InvalidInput`] if either odds is `<= 1` or the bankroll is
///   not positive.
/// - [`CalcError::NoArbitrage`] if `1/home_odds + 1/away_odds >= 1`.
pub fn compute_stakes(
    home_odds: Decimal,
    away_odds: Decimal,
    bankroll: Decimal,
) -> Result<StakeAllocation, CalcError> {
    let allocation = allocate(home_odds, away_odds, bankroll)?;
    if !allocation.is_arbitrage() {
        tracing::debug!(
            home_odds = %home_odds,
            away_odds = %away_odds,
            total_implied = %allocation.total_implied,
            "Odds do not form an arbitrage"
        );
        return Err(CalcError::NoArbitrage {
            total_implied: allocation.total_implied,
        });
    }
    Ok(allocation)
}

/// Checks a three-outcome market (home/draw/away) and returns the guaranteed
/// profit percentage.
///
/// # Errors
/// - [`CalcError::InvalidInput`] if any odds is `<= 1`.
/// - [`CalcError::NoArbitrage`] if the implied probabilities sum to 1 or more.
pub fn three_way(
    home_odds: Decimal,
    draw_odds: Decimal,
    away_odds: Decimal,
) -> Result<Decimal, CalcError> {
    let total_implied = implied_probability(home_odds)?
        + implied_probability(draw_odds)?
        + implied_probability(away_odds)?;

    if total_implied >= Decimal::ONE {
        return Err(CalcError::NoArbitrage { total_implied });
    }
    Ok((Decimal::ONE / total_implied - Decimal::ONE) * dec!(100))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: Decimal, expected: Decimal, tolerance: Decimal) {
        assert!(
            (actual - expected).abs() <= tolerance,
            "expected {expected} ± {tolerance}, got {actual}"
        );
    }

    // ==================== compute_stakes ====================

    #[test]
    fn test_reference_case() {
        let alloc = compute_stakes(dec!(1.91), dec!(2.20), dec!(1000)).unwrap();

        assert_close(alloc.implied_home, dec!(0.52356), dec!(0.00001));
        assert_close(alloc.implied_away, dec!(0.45455), dec!(0.00001));
        assert_close(alloc.total_implied, dec!(0.97811), dec!(0.00001));
        assert_close(alloc.stake_home, dec!(535.28), dec!(0.01));
        assert_close(alloc.stake_away, dec!(464.72), dec!(0.01));
        assert_close(alloc.profit_percent, dec!(2.24), dec!(0.01));
        assert_close(alloc.expected_return, dec!(1022.38), dec!(0.01));
        assert_close(alloc.net_profit, dec!(22.38), dec!(0.01));
        assert!(alloc.is_arbitrage());
    }

    #[test]
    fn test_stakes_sum_to_bankroll() {
        let alloc = compute_stakes(dec!(1.91), dec!(2.20), dec!(1000)).unwrap();
        assert_close(alloc.total_stake(), dec!(1000), dec!(0.000001));
    }

    #[test]
    fn test_stakes_sum_across_odds_grid() {
        let odds = [
            dec!(1.01),
            dec!(1.5),
            dec!(1.91),
            dec!(2.0),
            dec!(2.2),
            dec!(3.75),
            dec!(11),
            dec!(101),
        ];
        let bankrolls = [dec!(0.01), dec!(1), dec!(250.5), dec!(1000), dec!(1000000)];

        for home in odds {
            for away in odds {
                for bankroll in bankrolls {
                    let alloc = allocate(home, away, bankroll).unwrap();
                    assert_close(alloc.total_stake(), bankroll, dec!(0.01));

                    let rounded = alloc.rounded();
                    assert_close(rounded.total_stake(), bankroll, dec!(0.01));
                }
            }
        }
    }

    #[test]
    fn test_overround_signals_no_arbitrage() {
        let err = compute_stakes(dec!(1.80), dec!(1.90), dec!(1000)).unwrap_err();
        match err {
            CalcError::NoArbitrage { total_implied } => {
                assert_close(total_implied, dec!(1.0819), dec!(0.0001));
            }
            other => panic!("expected NoArbitrage, got {other:?}"),
        }
    }

    #[test]
    fn test_exact_break_even_is_not_arbitrage() {
        let err = compute_stakes(dec!(2), dec!(2), dec!(100)).unwrap_err();
        assert_eq!(
            err,
            CalcError::NoArbitrage {
                total_implied: Decimal::ONE
            }
        );
    }

    #[test]
    fn test_allocate_still_splits_overround() {
        let alloc = allocate(dec!(1.80), dec!(1.90), dec!(1000)).unwrap();
        assert!(!alloc.is_arbitrage());
        assert!(alloc.profit_percent < Decimal::ZERO);
        assert_close(alloc.total_stake(), dec!(1000), dec!(0.000001));
    }

    #[test]
    fn test_invalid_odds_rejected() {
        for (home, away) in [
            (dec!(1), dec!(2)),
            (dec!(2), dec!(1)),
            (dec!(0), dec!(2)),
            (dec!(-1.5), dec!(2)),
        ] {
            let err = compute_stakes(home, away, dec!(100)).unwrap_err();
            assert!(matches!(err, CalcError::InvalidInput(_)), "{home}/{away}");
        }
    }

    #[test]
    fn test_non_positive_bankroll_rejected() {
        for bankroll in [dec!(0), dec!(-10)] {
            let err = compute_stakes(dec!(1.91), dec!(2.20), bankroll).unwrap_err();
            assert!(matches!(err, CalcError::InvalidInput(_)));
        }
    }

    #[test]
    fn test_invalid_input_distinct_from_no_arbitrage() {
        let invalid = compute_stakes(dec!(1), dec!(1.5), dec!(100)).unwrap_err();
        assert!(invalid.to_string().starts_with("invalid input"));

        let no_arb = compute_stakes(dec!(1.5), dec!(1.5), dec!(100)).unwrap_err();
        assert!(no_arb.to_string().starts_with("no arbitrage"));
    }

    #[test]
    fn test_rounded_values() {
        let alloc = compute_stakes(dec!(1.91), dec!(2.20), dec!(1000))
            .unwrap()
            .rounded();
        assert_eq!(alloc.stake_home, dec!(535.28));
        assert_eq!(alloc.stake_away, dec!(464.72));
        assert_eq!(alloc.profit_percent, dec!(2.24));
        assert_eq!(alloc.net_profit, dec!(22.38));
    }

    // ==================== three_way ====================

    #[test]
    fn test_three_way_arbitrage() {
        // 1/3.2 + 1/3.6 + 1/4.0 = 0.8403
        let profit = three_way(dec!(3.2), dec!(3.6), dec!(4.0)).unwrap();
        assert_close(profit, dec!(19.01), dec!(0.01));
    }

    #[test]
    fn test_three_way_no_arbitrage() {
        let err = three_way(dec!(2.1), dec!(3.3), dec!(3.5)).unwrap_err();
        assert!(matches!(err, CalcError::NoArbitrage { .. }));
    }

    #[test]
    fn test_three_way_invalid_draw() {
        let err = three_way(dec!(3.2), dec!(1), dec!(4.0)).unwrap_err();
        assert!(matches!(err, CalcError::InvalidInput(_)));
    }
}
