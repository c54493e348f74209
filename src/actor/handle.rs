//! Client side of the leaderboard actor

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};

use crate::error::LeaderboardError;
use crate::hub::{SubscriberHub, SubscriberId, Subscription};
use crate::ranking::{LeaderboardEntry, SubmitOutcome};

use super::leaderboard::Command;
use super::submission::{validate_player_id, ScoreSubmission};

/// Cloneable handle to a running [`LeaderboardActor`](super::LeaderboardActor)
///
/// Input is validated here, before anything is queued, so malformed requests
/// never reach the table.
///
/// # Example
/// ```no_run
/// use std::sync::Arc;
/// use leaderboard_rs::actor::{LeaderboardActor, LeaderboardConfig};
/// use leaderboard_rs::hub::SubscriberHub;
/// use leaderboard_rs::store::MemoryStore;
///
/// # async fn example() -> Result<(), leaderboard_rs::error::LeaderboardError> {
/// let hub = Arc::new(SubscriberHub::new());
/// let (handle, _task) =
///     LeaderboardActor::spawn(MemoryStore::new(), hub, LeaderboardConfig::default());
///
/// handle.submit_score("p1", "Alice", 100.0).await?;
/// let top = handle.get_leaderboard(1).await?;
/// assert_eq!(top[0].rank, 1);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct LeaderboardHandle {
    tx: mpsc::Sender<Command>,
    hub: Arc<SubscriberHub>,
    default_limit: usize,
}

impl LeaderboardHandle {
    pub(crate) fn new(
        tx: mpsc::Sender<Command>,
        hub: Arc<SubscriberHub>,
        default_limit: usize,
    ) -> Self {
        Self {
            tx,
            hub,
            default_limit,
        }
    }

    /// Get the subscriber hub
    pub fn hub(&self) -> &Arc<SubscriberHub> {
        &self.hub
    }

    /// Default number of entries returned by [`leaderboard`](Self::leaderboard)
    pub fn default_limit(&self) -> usize {
        self.default_limit
    }

    /// Validate and submit a score, then broadcast the new standings
    pub async fn submit_score(
        &self,
        player_id: impl Into<String>,
        player_name: impl Into<String>,
        score: f64,
    ) -> Result<SubmitOutcome, LeaderboardError> {
        let submission = ScoreSubmission::new(player_id, player_name, score)?;
        self.submit(submission).await
    }

    /// Submit an already validated score
    pub async fn submit(&self, submission: ScoreSubmission) -> Result<SubmitOutcome, LeaderboardError> {
        self.request(|reply| Command::Submit { submission, reply })
            .await
    }

    /// Remove a player
    ///
    /// Returns whether the player was present. Only an actual removal is
    /// persisted and broadcast.
    pub async fn delete_score(&self, player_id: &str) -> Result<bool, LeaderboardError> {
        let player_id = validate_player_id(player_id)?;
        self.request(|reply| Command::Delete { player_id, reply })
            .await
    }

    /// Top `limit` entries in rank order
    pub async fn get_leaderboard(
        &self,
        limit: usize,
    ) -> Result<Vec<LeaderboardEntry>, LeaderboardError> {
        self.request(|reply| Command::Query { limit, reply }).await
    }

    /// Top entries using the default limit
    pub async fn leaderboard(&self) -> Result<Vec<LeaderboardEntry>, LeaderboardError> {
        self.get_leaderboard(self.default_limit).await
    }

    /// Register a live subscriber
    ///
    /// Registration is ordered with mutations, so the initial snapshot is
    /// never older than a broadcast the subscriber missed.
    pub async fn subscribe(&self) -> Result<Subscription, LeaderboardError> {
        self.request(|reply| Command::Subscribe { reply }).await
    }

    /// Drop a live subscriber
    pub async fn unsubscribe(&self, id: SubscriberId) -> bool {
        self.hub.unregister(id).await
    }

    async fn request<T>(
        &self,
        command: impl FnOnce(oneshot::Sender<Result<T, LeaderboardError>>) -> Command,
    ) -> Result<T, LeaderboardError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(command(reply))
            .await
            .map_err(|_| LeaderboardError::Closed)?;
        rx.await.map_err(|_| LeaderboardError::Closed)?
    }
}
