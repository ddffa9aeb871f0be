//! One-off stake calculation.
//!
//! ```bash
//! arbwatch calc --home-odds 1.91 --away-odds 2.20 --bankroll 1000
//! arbwatch calc --home-odds 2.9 --away-odds 3.1 --draw-odds 3.6
//! ```

use anyhow::Result;
use arbwatch_arbitrage::{allocate, compute_stakes, three_way, CalcError};
use arbwatch_core::DEFAULT_CONFIG_PATH;
use clap::Args;
use rust_decimal::Decimal;
use tracing::warn;

use super::load_config;
use crate::board::BoardFormatter;

#[derive(Args, Debug, Clone)]
pub struct CalcArgs {
    /// Decimal odds on the home side
    #[arg(long)]
    pub home_odds: Decimal,

    /// Decimal odds on the away side
    #[arg(long)]
    pub away_odds: Decimal,

    /// Amount to split across both sides (defaults to calculator.default_bankroll)
    #[arg(long)]
    pub bankroll: Option<Decimal>,

    /// Draw odds, to also check the three-way market
    #[arg(long)]
    pub draw_odds: Option<Decimal>,

    /// Config file path
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    pub config: String,
}

pub fn run_calc(args: CalcArgs) -> Result<()> {
    let bankroll = match args.bankroll {
        Some(bankroll) => bankroll,
        None => load_config(&args.config, None)?.calculator.default_bankroll,
    };

    let allocation = match compute_stakes(args.home_odds, args.away_odds, bankroll) {
        Ok(allocation) => allocation,
        Err(CalcError::NoArbitrage { total_implied }) => {
            warn!(
                total_implied = %total_implied,
                "Odds do not form an arbitrage, showing stakes anyway"
            );
            allocate(args.home_odds, args.away_odds, bankroll)?
        }
        Err(e) => return Err(e.into()),
    };

    let three_way_profit = match args.draw_odds {
        Some(draw_odds) => match three_way(args.home_odds, draw_odds, args.away_odds) {
            Ok(profit) => Some(profit),
            Err(e) => {
                warn!(error = %e, "Three-way market check failed");
                None
            }
        },
        None => None,
    };

    println!(
        "{}",
        BoardFormatter::format_stakes(args.home_odds, args.away_odds, &allocation, three_way_profit)
    );
    Ok(())
}
