//! Leaderboard actor
//!
//! The actor is the single authority over the ranking table. All operations
//! on one leaderboard go through one FIFO queue:
//!
//! ```text
//!   [HTTP submit]   [HTTP delete]   [ws submit]   [ws connect]
//!         │               │              │              │
//!         └───────────────┴──── mpsc ────┴──────────────┘
//!                              │
//!                              ▼
//!                     LeaderboardActor task
//!              load ──► RankingTable ──► store ──► hub.broadcast()
//! ```
//!
//! Queries go through the same queue, so they always observe a table either
//! fully before or fully after a given mutation.

pub mod config;
pub mod handle;
pub mod leaderboard;
pub mod submission;

pub use config::LeaderboardConfig;
pub use handle::LeaderboardHandle;
pub use leaderboard::LeaderboardActor;
pub use submission::ScoreSubmission;
