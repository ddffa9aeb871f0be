mod calc;
mod snapshot;
mod watch;

pub use calc::{run_calc, CalcArgs};
pub use snapshot::{run_snapshot, SnapshotArgs};
pub use watch::{run_watch, WatchArgs};

use anyhow::{Context, Result};
use arbwatch_core::{AppConfig, ConfigLoader};
use arbwatch_session::OpportunityFilter;
use clap::ValueEnum;

/// Board filter as a CLI flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum FilterArg {
    /// Show every opportunity
    #[default]
    All,
    /// Only opportunities at or above the high-profit threshold
    HighProfit,
}

impl From<FilterArg> for OpportunityFilter {
    fn from(arg: FilterArg) -> Self {
        match arg {
            FilterArg::All => Self::All,
            FilterArg::HighProfit => Self::HighProfit,
        }
    }
}

/// Loads config from `path`, overlaid with `profile` when given.
pub(crate) fn load_config(path: &str, profile: Option<&str>) -> Result<AppConfig> {
    let config = match profile {
        Some(profile) => ConfigLoader::load_with_profile(path, profile),
        None => ConfigLoader::load_from(path),
    };
    config.with_context(|| format!("Failed to load config from {path}"))
}
