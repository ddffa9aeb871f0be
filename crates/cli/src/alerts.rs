use std::io::Write;

use anyhow::Result;
use arbwatch_core::{AlertIntent, AlertSink, AlertTier};
use async_trait::async_trait;
use tracing::{info, warn};

/// Renders alerts as log lines; audible alerts ring the terminal bell.
pub struct TerminalAlertSink {
    bell: bool,
}

impl TerminalAlertSink {
    #[must_use]
    pub fn new(bell: bool) -> Self {
        Self { bell }
    }
}

#[async_trait]
impl AlertSink for TerminalAlertSink {
    async fn deliver(&self, alert: &AlertIntent) -> Result<()> {
        let display_ms = u64::try_from(alert.display_for.as_millis()).unwrap_or(u64::MAX);
        match alert.tier {
            AlertTier::HighProfit => warn!(
                id = %alert.opportunity_id,
                display_ms,
                "{}",
                alert.message
            ),
            AlertTier::Standard => info!(
                id = %alert.opportunity_id,
                display_ms,
                "{}",
                alert.message
            ),
        }

        if alert.audible && self.bell {
            let mut stderr = std::io::stderr();
            stderr.write_all(b"\x07")?;
            stderr.flush()?;
        }
        Ok(())
    }
}
