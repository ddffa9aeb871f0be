//! Alert decisions for newly-seen opportunities.

use std::time::Duration;

use arbwatch_core::{AlertConfig, AlertIntent, AlertTier, ArbitrageOpportunity};
use rust_decimal::Decimal;

/// Decides tier, wording and presentation of alerts.
#[derive(Debug, Clone, PartialEq)]
pub struct NotificationPolicy {
    high_profit_threshold: Decimal,
    high_profit_display: Duration,
    standard_display: Duration,
}

impl Default for NotificationPolicy {
    fn default() -> Self {
        Self::from_config(&AlertConfig::default())
    }
}

impl NotificationPolicy {
    #[must_use]
    pub fn from_config(config: &AlertConfig) -> Self {
        Self {
            high_profit_threshold: config.high_profit_threshold,
            high_profit_display: Duration::from_millis(config.high_profit_display_ms),
            standard_display: Duration::from_millis(config.standard_display_ms),
        }
    }

    #[must_use]
    pub fn high_profit_threshold(&self) -> Decimal {
        self.high_profit_threshold
    }

    #[must_use]
    pub fn is_high_profit(&self, opportunity: &ArbitrageOpportunity) -> bool {
        opportunity.profit_percent >= self.high_profit_threshold
    }

    #[must_use]
    pub fn classify(&self, opportunity: &ArbitrageOpportunity) -> AlertTier {
        if self.is_high_profit(opportunity) {
            AlertTier::HighProfit
        } else {
            AlertTier::Standard
        }
    }

    /// Builds the alert for one newly-seen opportunity.
    #[must_use]
    pub fn intent(&self, opportunity: &ArbitrageOpportunity) -> AlertIntent {
        let tier = self.classify(opportunity);
        let profit = opportunity.profit_percent.round_dp(2);
        let (message, display_for, audible) = match tier {
            AlertTier::HighProfit => (
                format!(
                    "HIGH PROFIT: {profit:.2}% - {} vs {}",
                    opportunity.home_team, opportunity.away_team
                ),
                self.high_profit_display,
                true,
            ),
            AlertTier::Standard => (
                format!(
                    "New arbitrage: {profit:.2}% - {} vs {}",
                    opportunity.home_team, opportunity.away_team
                ),
                self.standard_display,
                false,
            ),
        };

        AlertIntent {
            tier,
            message,
            opportunity_id: opportunity.id.clone(),
            display_for,
            audible,
        }
    }

    /// One intent per opportunity, in input order.
    pub fn intents<'a>(
        &self,
        newly_seen: impl IntoIterator<Item = &'a ArbitrageOpportunity>,
    ) -> Vec<AlertIntent> {
        newly_seen.into_iter().map(|o| self.intent(o)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::opportunity_with_profit;
    use rust_decimal_macros::dec;

    #[test]
    fn test_threshold_is_inclusive() {
        let policy = NotificationPolicy::default();
        assert_eq!(
            policy.classify(&opportunity_with_profit("a", dec!(2.0))),
            AlertTier::HighProfit
        );
        assert_eq!(
            policy.classify(&opportunity_with_profit("b", dec!(1.99))),
            AlertTier::Standard
        );
    }

    #[test]
    fn test_high_profit_intent() {
        let policy = NotificationPolicy::default();
        let intent = policy.intent(&opportunity_with_profit("arb-1", dec!(2.5)));

        assert_eq!(intent.tier, AlertTier::HighProfit);
        assert_eq!(intent.message, "HIGH PROFIT: 2.50% - Lakers vs Celtics");
        assert_eq!(intent.opportunity_id, "arb-1");
        assert_eq!(intent.display_for, Duration::from_secs(10));
        assert!(intent.audible);
    }

    #[test]
    fn test_standard_intent() {
        let policy = NotificationPolicy::default();
        let intent = policy.intent(&opportunity_with_profit("arb-2", dec!(1.234)));

        assert_eq!(intent.tier, AlertTier::Standard);
        assert_eq!(intent.message, "New arbitrage: 1.23% - Lakers vs Celtics");
        assert_eq!(intent.display_for, Duration::from_secs(5));
        assert!(!intent.audible);
    }

    #[test]
    fn test_custom_threshold() {
        let policy = NotificationPolicy::from_config(&AlertConfig {
            high_profit_threshold: dec!(5),
            ..AlertConfig::default()
        });
        assert_eq!(
            policy.classify(&opportunity_with_profit("a", dec!(4.9))),
            AlertTier::Standard
        );
    }

    #[test]
    fn test_intents_preserve_order() {
        let policy = NotificationPolicy::default();
        let opps = [
            opportunity_with_profit("x", dec!(0.5)),
            opportunity_with_profit("y", dec!(3.0)),
        ];
        let intents = policy.intents(opps.iter());
        let ids: Vec<_> = intents.iter().map(|i| i.opportunity_id.as_str()).collect();
        assert_eq!(ids, vec!["x", "y"]);
        assert_eq!(intents[1].tier, AlertTier::HighProfit);
    }
}
