//! Fetch the current opportunity list once and print it.

use anyhow::Result;
use arbwatch_core::{ConnectionState, DEFAULT_CONFIG_PATH};
use arbwatch_feed::HttpSnapshotClient;
use arbwatch_session::{DashboardStats, NotificationPolicy, OpportunityFilter, OpportunityView};
use chrono::Utc;
use clap::Args;

use super::{load_config, FilterArg};
use crate::board::BoardFormatter;

#[derive(Args, Debug, Clone)]
pub struct SnapshotArgs {
    /// Config file path
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    pub config: String,

    /// Config profile overlay (loads Config.<profile>.toml)
    #[arg(long, env = "ARBWATCH_PROFILE")]
    pub profile: Option<String>,

    /// Backend base URL (overrides snapshot.base_url)
    #[arg(long)]
    pub api_url: Option<String>,

    /// Which opportunities to print
    #[arg(long, default_value = "all", value_enum)]
    pub filter: FilterArg,

    /// Print raw JSON instead of the board
    #[arg(long)]
    pub json: bool,
}

pub async fn run_snapshot(args: SnapshotArgs) -> Result<()> {
    let mut config = load_config(&args.config, args.profile.as_deref())?;
    if let Some(url) = args.api_url {
        config.snapshot.base_url = url;
    }

    let client = HttpSnapshotClient::new(&config.snapshot)?;
    let opportunities = client.fetch().await?;

    let policy = NotificationPolicy::from_config(&config.alerts);
    let filter = OpportunityFilter::from(args.filter);
    let visible = filter.apply(&opportunities, &policy);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&visible)?);
        return Ok(());
    }

    let stats = DashboardStats::compute(&opportunities, &policy);
    let rows = OpportunityView::build(visible, Utc::now());
    println!(
        "{}",
        BoardFormatter::format_board(ConnectionState::Disconnected, &stats, &rows, filter)
    );
    Ok(())
}
