//! Leaderboard server
//!
//! Run with: cargo run --bin leaderboard-server -- [OPTIONS]
//!
//! Examples:
//!   leaderboard-server                               # binds to 0.0.0.0:8787, in-memory
//!   leaderboard-server --bind 127.0.0.1:9000         # custom address
//!   leaderboard-server --data-dir ./data             # persist scores to ./data/scores.json
//!
//! ## Try it
//!
//!   curl -X POST localhost:8787/api/leaderboard/submit \
//!        -d '{"playerId":"p1","playerName":"Alice","score":100}'
//!   curl localhost:8787/api/leaderboard/get
//!   websocat ws://localhost:8787/api/leaderboard/ws

use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use leaderboard_rs::actor::config::DEFAULT_SNAPSHOT_LIMIT;
use leaderboard_rs::ranking::DEFAULT_CAPACITY;
use leaderboard_rs::{LeaderboardConfig, LeaderboardServer, ServerConfig};

#[derive(Debug, Parser)]
#[command(name = "leaderboard-server", version, about)]
struct Args {
    /// Address to listen on
    #[arg(long, default_value = "0.0.0.0:8787")]
    bind: SocketAddr,

    /// Persist the leaderboard under this directory (in-memory if omitted)
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Maximum players kept in the table
    #[arg(long, default_value_t = DEFAULT_CAPACITY)]
    capacity: usize,

    /// Entries pushed to subscribers and returned by default
    #[arg(long, default_value_t = DEFAULT_SNAPSHOT_LIMIT)]
    snapshot_limit: usize,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("leaderboard_rs=info")),
        )
        .init();

    let args = Args::parse();

    let mut config = ServerConfig::with_addr(args.bind).leaderboard(
        LeaderboardConfig::default()
            .capacity(args.capacity)
            .snapshot_limit(args.snapshot_limit),
    );
    if let Some(dir) = args.data_dir {
        config = config.data_dir(dir);
    }

    let server = LeaderboardServer::new(config);

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    match server.run_until(shutdown).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Server error");
            ExitCode::FAILURE
        }
    }
}
