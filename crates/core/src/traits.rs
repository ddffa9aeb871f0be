use crate::events::AlertIntent;
use crate::types::ArbitrageOpportunity;
use anyhow::Result;
use async_trait::async_trait;

/// Request/response source of the opportunity list used to seed a session.
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    async fn fetch_snapshot(&self) -> Result<Vec<ArbitrageOpportunity>>;
}

/// External notifier that renders alert intents.
#[async_trait]
pub trait AlertSink: Send + Sync {
    async fn deliver(&self, alert: &AlertIntent) -> Result<()>;
}
