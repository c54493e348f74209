//! Leaderboard configuration

use crate::hub::DEFAULT_SUBSCRIBER_QUEUE;
use crate::ranking::DEFAULT_CAPACITY;

/// Default number of entries in pushed snapshots and default queries
pub const DEFAULT_SNAPSHOT_LIMIT: usize = 10;

/// Default bound of the actor's command queue
pub const DEFAULT_QUEUE_CAPACITY: usize = 256;

/// Configuration for a leaderboard instance
#[derive(Debug, Clone)]
pub struct LeaderboardConfig {
    /// Maximum players kept in the ranking table
    pub capacity: usize,

    /// Entries pushed to subscribers and returned by default queries
    pub snapshot_limit: usize,

    /// Pending commands before callers wait for queue space
    pub queue_capacity: usize,

    /// Snapshots buffered per subscriber before it is dropped as stalled
    pub subscriber_queue: usize,
}

impl Default for LeaderboardConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            snapshot_limit: DEFAULT_SNAPSHOT_LIMIT,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            subscriber_queue: DEFAULT_SUBSCRIBER_QUEUE,
        }
    }
}

impl LeaderboardConfig {
    /// Set the table capacity (at least 1)
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity.max(1);
        self
    }

    /// Set the snapshot size (at least 1)
    pub fn snapshot_limit(mut self, limit: usize) -> Self {
        self.snapshot_limit = limit.max(1);
        self
    }

    /// Set the command queue bound (at least 1)
    pub fn queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity.max(1);
        self
    }

    /// Set the per-subscriber queue bound (at least 1)
    pub fn subscriber_queue(mut self, capacity: usize) -> Self {
        self.subscriber_queue = capacity.max(1);
        self
    }
}
