#![allow(clippy::format_push_string)]

use arbwatch_arbitrage::{american_odds, StakeAllocation};
use arbwatch_core::ConnectionState;
use arbwatch_session::{DashboardStats, ExpiryBucket, OpportunityFilter, OpportunityView};
use rust_decimal::Decimal;

const RULE: &str = "───────────────────────────────────────────────────────────────\n";
const BANNER: &str = "═══════════════════════════════════════════════════════════════\n";

/// Plain-text rendering of the board and calculator results.
pub struct BoardFormatter;

impl BoardFormatter {
    #[must_use]
    pub fn format_board(
        state: ConnectionState,
        stats: &DashboardStats,
        rows: &[OpportunityView<'_>],
        filter: OpportunityFilter,
    ) -> String {
        let mut output = String::new();

        output.push('\n');
        output.push_str(BANNER);
        output.push_str(&format!(
            "  LIVE ARBITRAGE                                 [{}]\n",
            state.label()
        ));
        output.push_str(BANNER);
        output.push_str(&format!(
            "Active Opportunities:  {}\nAverage Profit:        {}%\nHigh Profit (>= 2%):   {}\n",
            stats.total,
            fixed2(stats.average_profit),
            stats.high_profit
        ));
        output.push_str(RULE);

        if rows.is_empty() {
            let hint = match filter {
                OpportunityFilter::All => "Waiting for opportunities...",
                OpportunityFilter::HighProfit => "No high-profit opportunities right now",
            };
            output.push_str(hint);
            output.push('\n');
            return output;
        }

        for row in rows {
            output.push_str(&Self::format_row(row));
            output.push('\n');
        }
        output
    }

    #[must_use]
    pub fn format_row(row: &OpportunityView<'_>) -> String {
        let opp = row.opportunity;
        let marker = match row.bucket {
            ExpiryBucket::Active => ' ',
            ExpiryBucket::Imminent => '!',
            ExpiryBucket::Expired => 'x',
        };
        format!(
            "{marker} {:>7}  {:>7}  {:<16} {}  {} @ {} / {} @ {}  [{}]",
            row.remaining,
            format!("{}%", fixed2(opp.profit_percent)),
            opp.sport,
            opp.matchup(),
            opp.bookmaker_home,
            fixed2(opp.home_odds),
            opp.bookmaker_away,
            fixed2(opp.away_odds),
            opp.status,
        )
    }

    #[must_use]
    pub fn format_stakes(
        home_odds: Decimal,
        away_odds: Decimal,
        allocation: &StakeAllocation,
        three_way_profit: Option<Decimal>,
    ) -> String {
        let rounded = allocation.rounded();
        let mut output = String::new();

        output.push('\n');
        output.push_str(BANNER);
        output.push_str("                   PROFIT CALCULATOR                           \n");
        output.push_str(BANNER);
        output.push('\n');

        output.push_str("Odds\n");
        output.push_str(RULE);
        output.push_str(&format!(
            "Home:                  {} ({})  implied {}%\n",
            fixed2(home_odds),
            american_odds(home_odds).unwrap_or_default(),
            fixed2(allocation.implied_home * Decimal::ONE_HUNDRED)
        ));
        output.push_str(&format!(
            "Away:                  {} ({})  implied {}%\n",
            fixed2(away_odds),
            american_odds(away_odds).unwrap_or_default(),
            fixed2(allocation.implied_away * Decimal::ONE_HUNDRED)
        ));
        output.push_str(&format!(
            "Total Implied:         {}%\n",
            fixed2(allocation.total_implied * Decimal::ONE_HUNDRED)
        ));
        output.push('\n');

        output.push_str("Stakes\n");
        output.push_str(RULE);
        output.push_str(&format!("Home Stake:            ${}\n", fixed2(rounded.stake_home)));
        output.push_str(&format!("Away Stake:            ${}\n", fixed2(rounded.stake_away)));
        output.push_str(&format!(
            "Total Stake:           ${}\n",
            fixed2(rounded.stake_home + rounded.stake_away)
        ));
        output.push('\n');

        output.push_str("Returns\n");
        output.push_str(RULE);
        output.push_str(&format!(
            "Expected Return:       ${}\n",
            fixed2(rounded.expected_return)
        ));
        output.push_str(&format!("Net Profit:            ${}\n", fixed2(rounded.net_profit)));
        output.push_str(&format!("Profit:                {}%\n", fixed2(rounded.profit_percent)));

        if let Some(profit) = three_way_profit {
            output.push_str(&format!("Three-Way Profit:      {}%\n", fixed2(profit)));
        }

        if !allocation.is_arbitrage() {
            output.push('\n');
            output.push_str("WARNING: implied probabilities sum to 100% or more.\n");
            output.push_str("These stakes do not guarantee a profit.\n");
        }

        output
    }
}

/// Two decimal places, zero-padded.
fn fixed2(value: Decimal) -> String {
    format!("{:.2}", value.round_dp(2))
}
