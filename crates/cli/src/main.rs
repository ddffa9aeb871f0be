use clap::{Parser, Subcommand};

mod alerts;
mod board;
mod commands;

use commands::{CalcArgs, SnapshotArgs, WatchArgs};

#[derive(Parser)]
#[command(name = "arbwatch")]
#[command(about = "Live sports betting arbitrage board", long_about = None)]
struct Cli {
    /// Optional log file path (logs to file instead of stderr)
    #[arg(long, global = true)]
    log_file: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Follow the live feed and print the board
    Watch(WatchArgs),
    /// Compute stakes and guaranteed profit for a pair of odds
    Calc(CalcArgs),
    /// Fetch the current opportunity list once
    Snapshot(SnapshotArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = || {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"))
    };
    match &cli.log_file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)?;
            tracing_subscriber::fmt()
                .with_env_filter(filter())
                .with_writer(std::sync::Mutex::new(file))
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter())
                .with_writer(std::io::stderr)
                .init();
        }
    }

    match cli.command {
        Commands::Watch(args) => commands::run_watch(args).await?,
        Commands::Calc(args) => commands::run_calc(args)?,
        Commands::Snapshot(args) => commands::run_snapshot(args).await?,
    }

    Ok(())
}
