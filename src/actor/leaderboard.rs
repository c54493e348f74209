//! Single-writer leaderboard task
//!
//! Every operation is a [`Command`] on one bounded queue consumed by one
//! task. A command runs to completion (load, apply, store, broadcast) before
//! the next one is taken, so two read-modify-write cycles never interleave
//! even though the store has no compare-and-swap.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::error::LeaderboardError;
use crate::hub::{SubscriberHub, Subscription};
use crate::ranking::{LeaderboardEntry, PlayerId, RankingTable, SubmitOutcome};
use crate::store::{KvStore, TableStore};

use super::config::LeaderboardConfig;
use super::handle::LeaderboardHandle;
use super::submission::{ScoreSubmission, SubmissionClock};

type Reply<T> = oneshot::Sender<Result<T, LeaderboardError>>;

/// Operation queued for the actor
pub(crate) enum Command {
    Submit {
        submission: ScoreSubmission,
        reply: Reply<SubmitOutcome>,
    },
    Delete {
        player_id: PlayerId,
        reply: Reply<bool>,
    },
    Query {
        limit: usize,
        reply: Reply<Vec<LeaderboardEntry>>,
    },
    Subscribe {
        reply: Reply<Subscription>,
    },
}

/// Owner of the ranking table
///
/// The table itself only exists inside one command: it is loaded from the
/// store, changed, persisted, then dropped. A failed store write therefore
/// leaves the previously persisted table authoritative.
pub struct LeaderboardActor<S: KvStore> {
    store: TableStore<S>,
    hub: Arc<SubscriberHub>,
    config: LeaderboardConfig,
    clock: SubmissionClock,
}

impl<S: KvStore> LeaderboardActor<S> {
    /// Spawn the actor on the current runtime
    ///
    /// Returns a handle for issuing operations and the task handle. The task
    /// exits once every handle has been dropped.
    pub fn spawn(
        store: S,
        hub: Arc<SubscriberHub>,
        config: LeaderboardConfig,
    ) -> (LeaderboardHandle, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(config.queue_capacity);
        let handle = LeaderboardHandle::new(tx, Arc::clone(&hub), config.snapshot_limit);

        let actor = Self {
            store: TableStore::new(store, config.capacity),
            hub,
            config,
            clock: SubmissionClock::new(),
        };

        let task = tokio::spawn(actor.run(rx));
        (handle, task)
    }

    async fn run(mut self, mut rx: mpsc::Receiver<Command>) {
        tracing::debug!(
            capacity = self.config.capacity,
            snapshot_limit = self.config.snapshot_limit,
            "Leaderboard actor started"
        );

        while let Some(command) = rx.recv().await {
            self.handle(command).await;
        }

        tracing::debug!("Leaderboard actor stopped");
    }

    async fn handle(&mut self, command: Command) {
        // A dropped reply receiver means the caller went away; the operation
        // still ran to completion.
        match command {
            Command::Submit { submission, reply } => {
                let _ = reply.send(self.submit(submission).await);
            }
            Command::Delete { player_id, reply } => {
                let _ = reply.send(self.delete(&player_id).await);
            }
            Command::Query { limit, reply } => {
                let _ = reply.send(self.query(limit).await);
            }
            Command::Subscribe { reply } => {
                let _ = reply.send(self.subscribe().await);
            }
        }
    }

    async fn load(&self) -> Result<RankingTable, LeaderboardError> {
        self.store.load_or_default().await.map_err(|e| {
            tracing::error!(error = %e, "Failed to load leaderboard");
            LeaderboardError::from(e)
        })
    }

    async fn persist(&self, table: &RankingTable) -> Result<(), LeaderboardError> {
        self.store.store(table).await.map_err(|e| {
            tracing::error!(error = %e, "Failed to persist leaderboard");
            LeaderboardError::from(e)
        })
    }

    async fn submit(
        &mut self,
        submission: ScoreSubmission,
    ) -> Result<SubmitOutcome, LeaderboardError> {
        let mut table = self.load().await?;

        let submitted_at = self.clock.next(table.latest_submission());
        let player_id = submission.player_id().clone();
        let score = submission.score();
        let outcome = table.apply_submit(submission.into_record(submitted_at));

        if !outcome.is_applied() {
            tracing::debug!(
                player_id = %player_id,
                score = %score,
                "Submission below full table, dropped"
            );
            return Ok(outcome);
        }

        self.persist(&table).await?;

        if let SubmitOutcome::Inserted {
            evicted: Some(ref evicted),
        } = outcome
        {
            tracing::debug!(player_id = %evicted, "Player evicted by capacity");
        }

        tracing::debug!(
            player_id = %player_id,
            score = %score,
            submitted_at = submitted_at,
            players = table.len(),
            "Score submitted"
        );

        self.hub
            .broadcast(&table.top_n(self.config.snapshot_limit))
            .await;

        Ok(outcome)
    }

    async fn delete(&self, player_id: &PlayerId) -> Result<bool, LeaderboardError> {
        let mut table = self.load().await?;

        if !table.apply_delete(player_id.as_str()) {
            tracing::debug!(player_id = %player_id, "Delete of absent player ignored");
            return Ok(false);
        }

        self.persist(&table).await?;

        tracing::debug!(
            player_id = %player_id,
            players = table.len(),
            "Player deleted"
        );

        self.hub
            .broadcast(&table.top_n(self.config.snapshot_limit))
            .await;

        Ok(true)
    }

    async fn query(&self, limit: usize) -> Result<Vec<LeaderboardEntry>, LeaderboardError> {
        Ok(self.load().await?.top_n(limit))
    }

    async fn subscribe(&self) -> Result<Subscription, LeaderboardError> {
        let snapshot = self.load().await?.top_n(self.config.snapshot_limit);
        Ok(self.hub.register(&snapshot).await)
    }
}
