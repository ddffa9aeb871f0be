//! Arbitrage arithmetic for two-bookmaker betting opportunities.
//!
//! When two bookmakers price the same binary outcome so that the implied
//! probabilities sum to less than one, staking both sides in proportion
//! guarantees the same payout whichever side wins:
//!
//! ```text
//! Bookmaker A: Lakers  @ 1.91   (implied 52.36%)
//! Bookmaker B: Celtics @ 2.20   (implied 45.45%)
//!                                 total  97.81%  < 100%
//!
//! Bankroll $1000:
//!   Lakers  stake  $535.28  -> pays $1022.38
//!   Celtics stake  $464.72  -> pays $1022.38
//!   Guaranteed profit: $22.38 (2.24%)
//! ```
//!
//! # Modules
//!
//! - [`calculator`]: stake allocation, two-way and three-way checks
//! - [`odds`]: display conversions
//! - [`consistency`]: verify pipeline-computed figures

pub mod calculator;
pub mod consistency;
pub mod odds;

pub use calculator::{
    allocate, compute_stakes, implied_probability, three_way, CalcError, StakeAllocation,
    CURRENCY_DP,
};
pub use consistency::{check_consistency, ConsistencyReport, STAKE_TOLERANCE};
pub use odds::american_odds;
