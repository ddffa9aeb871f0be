//! Live board: seed from the snapshot endpoint, then follow the feed.
//!
//! ```bash
//! arbwatch watch
//! arbwatch watch --ws-url ws://backend:8080/ws --filter high-profit --refresh-secs 2
//! ```

use anyhow::Result;
use arbwatch_core::DEFAULT_CONFIG_PATH;
use arbwatch_feed::{ConnectionConfig, ConnectionManager, HttpSnapshotClient};
use arbwatch_session::{
    CountdownTicker, DashboardStats, OpportunityFilter, OpportunityView, Session,
};
use clap::Args;
use tracing::{info, warn};

use super::{load_config, FilterArg};
use crate::alerts::TerminalAlertSink;
use crate::board::BoardFormatter;

#[derive(Args, Debug, Clone)]
pub struct WatchArgs {
    /// Config file path
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    pub config: String,

    /// Config profile overlay (loads Config.<profile>.toml)
    #[arg(long, env = "ARBWATCH_PROFILE")]
    pub profile: Option<String>,

    /// Feed websocket URL (overrides feed.ws_url)
    #[arg(long)]
    pub ws_url: Option<String>,

    /// Backend base URL for the startup snapshot (overrides snapshot.base_url)
    #[arg(long)]
    pub api_url: Option<String>,

    /// Which opportunities the board shows
    #[arg(long, default_value = "all", value_enum)]
    pub filter: FilterArg,

    /// Redraw the board every N seconds
    #[arg(long, default_value = "5")]
    pub refresh_secs: u64,

    /// Skip the startup snapshot and start from an empty board
    #[arg(long)]
    pub no_snapshot: bool,

    /// Do not ring the terminal bell for high-profit alerts
    #[arg(long)]
    pub no_bell: bool,
}

pub async fn run_watch(args: WatchArgs) -> Result<()> {
    let mut config = load_config(&args.config, args.profile.as_deref())?;
    if let Some(url) = args.ws_url {
        config.feed.ws_url = url;
    }
    if let Some(url) = args.api_url {
        config.snapshot.base_url = url;
    }

    let mut session = Session::from_config(&config);

    if args.no_snapshot {
        info!("Skipping startup snapshot");
    } else {
        let client = HttpSnapshotClient::new(&config.snapshot)?;
        session.seed(&client).await;
    }

    let (manager, events) =
        ConnectionManager::spawn(ConnectionConfig::from_feed_config(&config.feed));
    manager.open().await?;

    let stopper = manager.clone();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            return;
        }
        info!("Ctrl+C received, shutting down");
        stopper.shutdown().await;
    });

    let sink = TerminalAlertSink::new(!args.no_bell);
    let ticker = CountdownTicker::spawn();
    let filter = OpportunityFilter::from(args.filter);
    let refresh = args.refresh_secs.max(1);
    let mut ticks: u64 = 0;

    session
        .run(events, &sink, &ticker, |session, now| {
            ticks += 1;
            if ticks % refresh != 0 {
                return;
            }
            let snapshot = session.snapshot();
            let stats = DashboardStats::compute(&snapshot, session.policy());
            let rows = OpportunityView::build(filter.apply(&snapshot, session.policy()), now);
            println!(
                "{}",
                BoardFormatter::format_board(session.connection_state(), &stats, &rows, filter)
            );
        })
        .await;

    info!(stored = session.store().len(), "Watch ended");
    Ok(())
}
