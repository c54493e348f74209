//! Live subscriber fan-out
//!
//! The hub tracks every open websocket connection on the global leaderboard
//! channel and pushes a snapshot to all of them after each mutation.
//!
//! # Architecture
//!
//! ```text
//!                        Arc<SubscriberHub>
//!                  ┌────────────────────────────┐
//!                  │ subscribers: HashMap<Id,   │
//!                  │   Subscriber {             │
//!                  │     tx: mpsc::Sender,      │
//!                  │     state,                 │
//!                  │   }                        │
//!                  │ >                          │
//!                  └─────────────┬──────────────┘
//!                                │ try_send
//!        ┌───────────────────────┼───────────────────────┐
//!        ▼                       ▼                       ▼
//!   [Subscription]         [Subscription]         [Subscription]
//!   rx.recv()              rx.recv()              rx.recv()
//!        │                       │                       │
//!        └──► ws writer ──► socket
//! ```
//!
//! A snapshot is serialized once into a [`Payload`]; every connection
//! receives a reference-counted clone of the same string. Each connection has
//! its own bounded FIFO queue, so one subscriber always sees snapshots in the
//! order they were broadcast.
//!
//! Broadcasts never wait on a connection. A subscriber whose queue is full
//! (a client that stopped reading) or whose receiver is gone is pruned, and
//! delivery to the others carries on. Dropping the pruned sender ends the
//! connection's writer, which closes the session.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::sync::RwLock;

use crate::protocol::ServerMessage;
use crate::ranking::LeaderboardEntry;

/// Identifier of a subscriber connection
pub type SubscriberId = u64;

/// Serialized `update` message shared by every subscriber
pub type Payload = Arc<str>;

/// Default per-connection queue depth
pub const DEFAULT_SUBSCRIBER_QUEUE: usize = 64;

/// Connection lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Registered, initial snapshot not delivered yet
    Connecting,
    /// Receiving broadcasts
    Open,
    /// Closed or pruned after a failed send
    Closed,
}

struct Subscriber {
    tx: mpsc::Sender<Payload>,
    state: ConnectionState,
}

/// Receiving side of a registered connection
#[derive(Debug)]
pub struct Subscription {
    id: SubscriberId,
    rx: mpsc::Receiver<Payload>,
}

impl Subscription {
    /// Subscriber ID, used to unregister
    pub fn id(&self) -> SubscriberId {
        self.id
    }

    /// Wait for the next serialized snapshot
    ///
    /// Returns `None` once the hub has dropped this subscriber.
    pub async fn recv(&mut self) -> Option<Payload> {
        self.rx.recv().await
    }

    /// Take the next snapshot if one is queued
    pub fn try_recv(&mut self) -> Option<Payload> {
        self.rx.try_recv().ok()
    }

    /// Split into ID and receiver
    pub fn into_parts(self) -> (SubscriberId, mpsc::Receiver<Payload>) {
        (self.id, self.rx)
    }
}

/// Hub counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HubStats {
    /// Currently registered subscribers
    pub subscribers: usize,
    /// Broadcasts performed
    pub broadcasts: u64,
    /// Snapshots handed to subscriber queues (including initial ones)
    pub deliveries: u64,
    /// Subscribers removed after a failed or full send
    pub pruned: u64,
}

/// Set of live subscriber connections
///
/// Thread-safe via `RwLock`; broadcasting only needs the read lock, so
/// register/unregister from concurrent close paths never corrupt the set.
pub struct SubscriberHub {
    subscribers: RwLock<HashMap<SubscriberId, Subscriber>>,
    queue_capacity: usize,
    next_id: AtomicU64,
    broadcasts: AtomicU64,
    deliveries: AtomicU64,
    pruned: AtomicU64,
}

impl SubscriberHub {
    /// Create an empty hub with the default queue depth
    pub fn new() -> Self {
        Self::with_queue_capacity(DEFAULT_SUBSCRIBER_QUEUE)
    }

    /// Create an empty hub whose connections buffer at most `capacity`
    /// snapshots (minimum 1)
    pub fn with_queue_capacity(capacity: usize) -> Self {
        Self {
            subscribers: RwLock::new(HashMap::new()),
            queue_capacity: capacity.max(1),
            next_id: AtomicU64::new(1),
            broadcasts: AtomicU64::new(0),
            deliveries: AtomicU64::new(0),
            pruned: AtomicU64::new(0),
        }
    }

    /// Per-connection queue depth
    pub fn queue_capacity(&self) -> usize {
        self.queue_capacity
    }

    /// Serialize a snapshot into the `update` message
    pub fn encode(entries: &[LeaderboardEntry]) -> Result<Payload, serde_json::Error> {
        let message = ServerMessage::Update {
            leaderboard: entries.to_vec(),
        };
        serde_json::to_string(&message).map(Payload::from)
    }

    /// Register a connection and hand it the current snapshot
    ///
    /// The connection only becomes `Open` (eligible for broadcasts) once the
    /// snapshot is queued, so a late joiner never starts out stale.
    pub async fn register(&self, snapshot: &[LeaderboardEntry]) -> Subscription {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::channel(self.queue_capacity);

        let mut subscribers = self.subscribers.write().await;
        subscribers.insert(
            id,
            Subscriber {
                tx,
                state: ConnectionState::Connecting,
            },
        );

        if let Some(subscriber) = subscribers.get_mut(&id) {
            match Self::encode(snapshot) {
                Ok(payload) => {
                    if subscriber.tx.try_send(payload).is_ok() {
                        subscriber.state = ConnectionState::Open;
                        self.deliveries.fetch_add(1, Ordering::Relaxed);
                    }
                }
                Err(e) => {
                    tracing::error!(subscriber = id, error = %e, "Failed to encode snapshot");
                }
            }
        }

        tracing::info!(
            subscriber = id,
            subscribers = subscribers.len(),
            entries = snapshot.len(),
            "Subscriber added"
        );

        Subscription { id, rx }
    }

    /// Remove a connection
    ///
    /// Returns whether it was registered.
    pub async fn unregister(&self, id: SubscriberId) -> bool {
        let mut subscribers = self.subscribers.write().await;
        let removed = subscribers.remove(&id).is_some();

        if removed {
            tracing::debug!(
                subscriber = id,
                subscribers = subscribers.len(),
                "Subscriber removed"
            );
        }

        removed
    }

    /// Push a snapshot to every open connection
    ///
    /// Returns the number of connections the snapshot was delivered to.
    pub async fn broadcast(&self, entries: &[LeaderboardEntry]) -> usize {
        let payload = match Self::encode(entries) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::error!(error = %e, "Failed to encode snapshot");
                return 0;
            }
        };

        self.broadcasts.fetch_add(1, Ordering::Relaxed);

        let mut delivered = 0;
        let mut failed = Vec::new();
        {
            let subscribers = self.subscribers.read().await;
            for (id, subscriber) in subscribers.iter() {
                if subscriber.state != ConnectionState::Open {
                    continue;
                }
                match subscriber.tx.try_send(Arc::clone(&payload)) {
                    Ok(()) => delivered += 1,
                    Err(TrySendError::Full(_)) => failed.push((*id, "queue full")),
                    Err(TrySendError::Closed(_)) => failed.push((*id, "receiver gone")),
                }
            }
        }

        self.deliveries
            .fetch_add(delivered as u64, Ordering::Relaxed);

        if !failed.is_empty() {
            let mut subscribers = self.subscribers.write().await;
            for (id, reason) in &failed {
                if subscribers.remove(id).is_some() {
                    self.pruned.fetch_add(1, Ordering::Relaxed);
                    tracing::warn!(subscriber = id, reason = *reason, "Send failed, subscriber pruned");
                }
            }
        }

        tracing::debug!(
            delivered = delivered,
            pruned = failed.len(),
            entries = entries.len(),
            "Snapshot broadcast"
        );

        delivered
    }

    /// Lifecycle state of a connection; unknown IDs are `Closed`
    pub async fn connection_state(&self, id: SubscriberId) -> ConnectionState {
        self.subscribers
            .read()
            .await
            .get(&id)
            .map(|s| s.state)
            .unwrap_or(ConnectionState::Closed)
    }

    /// Number of registered connections
    pub async fn subscriber_count(&self) -> usize {
        self.subscribers.read().await.len()
    }

    /// Current counters
    pub async fn stats(&self) -> HubStats {
        HubStats {
            subscribers: self.subscriber_count().await,
            broadcasts: self.broadcasts.load(Ordering::Relaxed),
            deliveries: self.deliveries.load(Ordering::Relaxed),
            pruned: self.pruned.load(Ordering::Relaxed),
        }
    }
}

impl Default for SubscriberHub {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ranking::{PlayerId, Score};

    fn entries(names: &[(&str, f64)]) -> Vec<LeaderboardEntry> {
        names
            .iter()
            .enumerate()
            .map(|(i, (id, score))| LeaderboardEntry {
                rank: i + 1,
                player_id: PlayerId::new(*id),
                player_name: id.to_string(),
                score: Score::new(*score).unwrap(),
            })
            .collect()
    }

    fn decode(payload: &str) -> Vec<LeaderboardEntry> {
        match serde_json::from_str::<ServerMessage>(payload).unwrap() {
            ServerMessage::Update { leaderboard } => leaderboard,
        }
    }

    #[tokio::test]
    async fn test_register_sends_snapshot() {
        let hub = SubscriberHub::new();
        let snapshot = entries(&[("p1", 10.0)]);

        let mut sub = hub.register(&snapshot).await;
        assert_eq!(hub.connection_state(sub.id()).await, ConnectionState::Open);

        let payload = sub.recv().await.unwrap();
        assert_eq!(decode(&payload), snapshot);
    }

    #[tokio::test]
    async fn test_register_empty_snapshot() {
        let hub = SubscriberHub::new();
        let mut sub = hub.register(&[]).await;

        let payload = sub.recv().await.unwrap();
        assert_eq!(&*payload, r#"{"type":"update","leaderboard":[]}"#);
    }

    #[tokio::test]
    async fn test_broadcast_fan_out() {
        let hub = SubscriberHub::new();
        let mut subs = Vec::new();
        for _ in 0..3 {
            let mut sub = hub.register(&[]).await;
            sub.recv().await.unwrap();
            subs.push(sub);
        }

        let update = entries(&[("p1", 42.0)]);
        assert_eq!(hub.broadcast(&update).await, 3);

        let mut payloads = Vec::new();
        for sub in subs.iter_mut() {
            payloads.push(sub.recv().await.unwrap());
        }
        // One serialization shared by every queue
        assert!(payloads.iter().all(|p| Arc::ptr_eq(p, &payloads[0])));
        assert_eq!(decode(&payloads[0]), update);
    }

    #[tokio::test]
    async fn test_failed_send_prunes_only_that_subscriber() {
        let hub = SubscriberHub::new();
        let mut alive_a = hub.register(&[]).await;
        let dead = hub.register(&[]).await;
        let mut alive_b = hub.register(&[]).await;
        let dead_id = dead.id();
        drop(dead);

        let update = entries(&[("p1", 1.0)]);
        assert_eq!(hub.broadcast(&update).await, 2);

        alive_a.recv().await.unwrap();
        assert_eq!(decode(&alive_a.recv().await.unwrap()), update);
        alive_b.recv().await.unwrap();
        assert_eq!(decode(&alive_b.recv().await.unwrap()), update);

        assert_eq!(hub.connection_state(dead_id).await, ConnectionState::Closed);
        assert_eq!(hub.subscriber_count().await, 2);

        // Pruned subscriber is not counted again
        assert_eq!(hub.broadcast(&update).await, 2);
        assert_eq!(hub.stats().await.pruned, 1);
    }

    #[tokio::test]
    async fn test_stalled_subscriber_pruned() {
        let hub = SubscriberHub::with_queue_capacity(2);
        let mut reader = hub.register(&[]).await;
        let mut stalled = hub.register(&[]).await;
        let stalled_id = stalled.id();
        reader.recv().await.unwrap();

        // `stalled` never drains: snapshot + one update fill its queue
        for i in 0..3 {
            hub.broadcast(&entries(&[("p1", i as f64)])).await;
            assert_eq!(decode(&reader.recv().await.unwrap())[0].score.value(), i as f64);
        }

        assert_eq!(hub.connection_state(stalled_id).await, ConnectionState::Closed);
        assert_eq!(hub.subscriber_count().await, 1);
        assert_eq!(hub.stats().await.pruned, 1);

        // Queued snapshots drain, then the closed queue ends the stream
        assert!(stalled.recv().await.is_some());
        assert!(stalled.recv().await.is_some());
        assert!(stalled.recv().await.is_none());
    }

    #[test]
    fn test_queue_capacity_minimum() {
        assert_eq!(SubscriberHub::with_queue_capacity(0).queue_capacity(), 1);
        assert_eq!(SubscriberHub::new().queue_capacity(), DEFAULT_SUBSCRIBER_QUEUE);
    }

    #[tokio::test]
    async fn test_unregister() {
        let hub = SubscriberHub::new();
        let sub = hub.register(&[]).await;

        assert!(hub.unregister(sub.id()).await);
        assert!(!hub.unregister(sub.id()).await);
        assert_eq!(hub.broadcast(&[]).await, 0);
    }

    #[tokio::test]
    async fn test_ordering_per_subscriber() {
        let hub = SubscriberHub::new();
        let mut sub = hub.register(&[]).await;
        sub.recv().await.unwrap();

        for i in 0..5 {
            hub.broadcast(&entries(&[("p1", i as f64)])).await;
        }

        for i in 0..5 {
            let snapshot = decode(&sub.recv().await.unwrap());
            assert_eq!(snapshot[0].score.value(), i as f64);
        }
    }

    #[tokio::test]
    async fn test_concurrent_unregister() {
        let hub = std::sync::Arc::new(SubscriberHub::new());
        let mut ids = Vec::new();
        let mut subs = Vec::new();
        for _ in 0..16 {
            let sub = hub.register(&[]).await;
            ids.push(sub.id());
            subs.push(sub);
        }

        let tasks: Vec<_> = ids
            .into_iter()
            .map(|id| {
                let hub = hub.clone();
                tokio::spawn(async move { hub.unregister(id).await })
            })
            .collect();
        for task in tasks {
            assert!(task.await.unwrap());
        }

        assert_eq!(hub.subscriber_count().await, 0);
    }

    #[tokio::test]
    async fn test_stats() {
        let hub = SubscriberHub::new();
        let _a = hub.register(&[]).await;
        let _b = hub.register(&[]).await;
        hub.broadcast(&[]).await;

        let stats = hub.stats().await;
        assert_eq!(stats.subscribers, 2);
        assert_eq!(stats.broadcasts, 1);
        assert_eq!(stats.deliveries, 4);
        assert_eq!(stats.pruned, 0);
    }
}
