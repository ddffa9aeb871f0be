pub mod config;
pub mod config_loader;
pub mod events;
pub mod traits;
pub mod types;

pub use config::{
    AlertConfig, AppConfig, BackoffKind, CalculatorConfig, FeedConfig, SnapshotConfig, StoreConfig,
};
pub use config_loader::{ConfigLoader, DEFAULT_CONFIG_PATH};
pub use events::{AlertIntent, AlertTier, ConnectionState, FeedEvent};
pub use traits::{AlertSink, SnapshotSource};
pub use types::{
    ArbitrageOpportunity, Envelope, FeedMessage, OddsUpdate, OpportunityStatus, StatusUpdate,
    ValidationError,
};
