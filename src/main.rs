use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;

use commands::{ConfigCommand, LayoutCommand, QuestCommand, SyncCommand, WaypointCommand};
use config::Config;
use northstar_core::{HttpRemote, LocalStore, MemoryRemote, RemoteClient, SyncEngine};

#[derive(Parser)]
#[command(name = "northstar")]
#[command(version)]
#[command(about = "Waypoint tracking with offline-first sync", long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Reconcile local data with the remote store
    Sync(SyncCommand),

    /// Manage quests
    Quest(QuestCommand),

    /// Manage waypoints
    Waypoint(WaypointCommand),

    /// Compute the constellation layout for a quest
    Layout(LayoutCommand),

    /// Manage configuration
    Config(ConfigCommand),
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = Config::load(cli.config)?;

    if let Commands::Config(cmd) = &cli.command {
        return cmd.run(&config);
    }

    let local = LocalStore::new(config.data_dir.value.clone());

    // Without a configured remote the engine runs against a transient
    // in-memory table: mutations stay durable locally and pushes vanish.
    match &config.remote.base_url {
        Some(base_url) => {
            let remote = Arc::new(HttpRemote::new(base_url, config.remote.api_key.clone()));
            let mut engine = SyncEngine::new(remote, local);
            dispatch(cli.command, &mut engine).await
        }
        None => {
            let remote = Arc::new(MemoryRemote::new());
            let mut engine = SyncEngine::new(remote, local);
            dispatch(cli.command, &mut engine).await
        }
    }
}

async fn dispatch<R: RemoteClient>(
    command: Commands,
    engine: &mut SyncEngine<R>,
) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Commands::Sync(cmd) => cmd.run(engine).await,
        Commands::Quest(cmd) => cmd.run(engine).await,
        Commands::Waypoint(cmd) => cmd.run(engine).await,
        Commands::Layout(cmd) => cmd.run(engine).await,
        Commands::Config(_) => unreachable!("handled before engine construction"),
    }
}
