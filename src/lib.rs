//! Globally ranked leaderboard with live websocket fan-out
//!
//! One leaderboard, one writer. Every submit/delete goes through a single
//! actor that loads the ranking table, applies the change, persists it and
//! pushes the new top-N to every connected subscriber.
//!
//! - [`ranking`]: pure ranking engine (ordering, tie-break, capacity cut)
//! - [`store`]: opaque key-value persistence and the table codec
//! - [`actor`]: the single-writer coordinator and its handle
//! - [`hub`]: subscriber set and snapshot broadcast
//! - [`server`]: HTTP routes, websocket sessions and the listener
//!
//! # Example
//! ```no_run
//! use leaderboard_rs::{LeaderboardServer, ServerConfig};
//!
//! # async fn example() -> leaderboard_rs::Result<()> {
//! let config = ServerConfig::default().data_dir("./data");
//! LeaderboardServer::new(config).run().await
//! # }
//! ```

pub mod actor;
pub mod error;
pub mod hub;
pub mod protocol;
pub mod ranking;
pub mod server;
pub mod store;

pub use actor::{LeaderboardActor, LeaderboardConfig, LeaderboardHandle};
pub use error::{Error, LeaderboardError, Result, ValidationError};
pub use hub::SubscriberHub;
pub use ranking::{LeaderboardEntry, RankingTable};
pub use server::{LeaderboardServer, ServerConfig};
