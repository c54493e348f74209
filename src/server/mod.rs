//! Leaderboard server
//!
//! HTTP API and websocket endpoint in front of the leaderboard actor.

pub mod config;
pub mod listener;
pub mod routes;
pub mod ws;

pub use config::{ServerConfig, StorageConfig};
pub use listener::LeaderboardServer;
pub use routes::router;
