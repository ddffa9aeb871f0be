//! Live feed plumbing for arbitrage opportunities.
//!
//! - [`connection`]: reconnecting websocket actor and its handle
//! - [`state`]: the sans-IO connection state machine it drives
//! - [`decode`]: envelope decoding and validation
//! - [`snapshot`]: startup snapshot over HTTP

pub mod connection;
pub mod decode;
pub mod error;
pub mod snapshot;
pub mod state;

pub use connection::{ConnectionConfig, ConnectionManager};
pub use decode::{decode, DecodeError};
pub use error::{FeedError, SnapshotError};
pub use snapshot::{HttpSnapshotClient, SNAPSHOT_PATH};
pub use state::{Action, Backoff, ConnectionStateMachine, ReconnectPolicy};
