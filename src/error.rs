//! Error types
//!
//! - [`ValidationError`]: malformed input, rejected before any shared state is touched
//! - [`LeaderboardError`]: result of a leaderboard operation
//! - [`Error`]: server-level failures (binding, I/O, storage setup)

use thiserror::Error;

use crate::store::StoreError;

/// Malformed or missing request field
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("playerId is required")]
    MissingPlayerId,

    #[error("playerName is required")]
    MissingPlayerName,

    #[error("score must be a finite number")]
    InvalidScore,
}

/// Error type for leaderboard operations
#[derive(Debug, Error)]
pub enum LeaderboardError {
    /// Input rejected, nothing was applied
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Persistence failed, the operation was not applied
    #[error(transparent)]
    Storage(#[from] StoreError),

    /// The leaderboard actor is no longer running
    #[error("leaderboard is shut down")]
    Closed,
}

/// Server-level error
#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Leaderboard(#[from] LeaderboardError),
}

/// Result alias for server-level operations
pub type Result<T> = std::result::Result<T, Error>;
