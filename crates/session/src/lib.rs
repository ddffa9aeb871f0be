//! Client-side session state for the live arbitrage board.
//!
//! - [`store`]: `OpportunitySet` and snapshot diffs
//! - [`expiry`]: countdown buckets and the shared 1 Hz ticker
//! - [`notify`]: alert tier and wording for newly-seen opportunities
//! - [`view`]: filters, headline stats and per-row views
//! - [`session`]: the controller tying them to the feed

pub mod expiry;
pub mod notify;
pub mod session;
pub mod store;
pub mod view;

pub use expiry::{
    bucket, format_remaining, CountdownTicker, ExpiryBucket, IMMINENT_WINDOW, TICK_PERIOD,
};
pub use notify::NotificationPolicy;
pub use session::Session;
pub use store::{snapshot_diff, OpportunitySet, DEFAULT_CAPACITY};
pub use view::{stakes_for, DashboardStats, OpportunityFilter, OpportunityView};
