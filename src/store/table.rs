//! Ranking table persistence
//!
//! The whole table lives under one well-known key as a JSON object:
//!
//! ```text
//! { "<playerId>": { "playerName": "...", "score": 100, "timestamp": 1700000000000 }, ... }
//! ```
//!
//! Entries are written in rank order so the stored value reads top-down.

use std::collections::HashMap;

use bytes::Bytes;
use serde::{Deserialize, Serialize, Serializer};

use crate::ranking::{PlayerId, RankingTable, Score, ScoreRecord};

use super::error::StoreError;
use super::KvStore;

/// Key under which the ranking table is stored
pub const SCORES_KEY: &str = "scores";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredRecord {
    player_name: String,
    score: Score,
    timestamp: u64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StoredRecordRef<'a> {
    player_name: &'a str,
    score: Score,
    timestamp: u64,
}

struct RankedRecords<'a>(&'a RankingTable);

impl Serialize for RankedRecords<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.0.ranked().into_iter().map(|record| {
            (
                record.player_id.as_str(),
                StoredRecordRef {
                    player_name: &record.player_name,
                    score: record.score,
                    timestamp: record.submitted_at,
                },
            )
        }))
    }
}

/// Load/store of the serialized ranking table over a [`KvStore`]
#[derive(Debug)]
pub struct TableStore<S> {
    kv: S,
    key: String,
    capacity: usize,
}

impl<S: KvStore> TableStore<S> {
    /// Create a table store using the default key
    pub fn new(kv: S, capacity: usize) -> Self {
        Self::with_key(kv, SCORES_KEY, capacity)
    }

    /// Create a table store using a custom key
    pub fn with_key(kv: S, key: impl Into<String>, capacity: usize) -> Self {
        Self {
            kv,
            key: key.into(),
            capacity,
        }
    }

    /// Get the underlying key-value store
    pub fn inner(&self) -> &S {
        &self.kv
    }

    /// Load the table, `None` if nothing was ever stored
    ///
    /// A stored table larger than the configured capacity is cut down to it.
    pub async fn load(&self) -> Result<Option<RankingTable>, StoreError> {
        let Some(raw) = self.kv.get(&self.key).await? else {
            return Ok(None);
        };

        let table = decode_table(&raw, self.capacity).map_err(|source| StoreError::Corrupt {
            key: self.key.clone(),
            source,
        })?;

        Ok(Some(table))
    }

    /// Load the table, defaulting to an empty one
    pub async fn load_or_default(&self) -> Result<RankingTable, StoreError> {
        Ok(self
            .load()
            .await?
            .unwrap_or_else(|| RankingTable::with_capacity(self.capacity)))
    }

    /// Persist the table, replacing whatever was stored
    pub async fn store(&self, table: &RankingTable) -> Result<(), StoreError> {
        let raw = encode_table(table).map_err(|source| StoreError::Encode {
            key: self.key.clone(),
            source,
        })?;
        self.kv.put(&self.key, raw).await
    }
}

/// Encode a table into its stored JSON form
pub fn encode_table(table: &RankingTable) -> Result<Bytes, serde_json::Error> {
    serde_json::to_vec(&RankedRecords(table)).map(Bytes::from)
}

/// Decode a table from its stored JSON form
pub fn decode_table(raw: &[u8], capacity: usize) -> Result<RankingTable, serde_json::Error> {
    let stored: HashMap<String, StoredRecord> = serde_json::from_slice(raw)?;
    let records = stored.into_iter().map(|(id, record)| {
        ScoreRecord::new(
            PlayerId::new(id),
            record.player_name,
            record.score,
            record.timestamp,
        )
    });
    Ok(RankingTable::from_records(records, capacity))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn record(id: &str, name: &str, score: f64, at: u64) -> ScoreRecord {
        ScoreRecord::new(PlayerId::new(id), name, Score::new(score).unwrap(), at)
    }

    #[test]
    fn test_encode_layout() {
        let mut table = RankingTable::new();
        table.apply_submit(record("p1", "Alice", 100.0, 1700));

        let raw = encode_table(&table).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&raw).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"p1": {"playerName": "Alice", "score": 100, "timestamp": 1700}})
        );
    }

    #[test]
    fn test_encode_in_rank_order() {
        let mut table = RankingTable::new();
        table.apply_submit(record("low", "Low", 1.0, 1));
        table.apply_submit(record("high", "High", 9.0, 2));

        let raw = encode_table(&table).unwrap();
        let text = std::str::from_utf8(&raw).unwrap();
        assert!(text.find("\"high\"").unwrap() < text.find("\"low\"").unwrap());
    }

    #[test]
    fn test_decode_rejects_non_finite_or_garbage() {
        assert!(decode_table(b"not json", 100).is_err());
        assert!(decode_table(b"{\"p1\":{\"playerName\":\"A\",\"score\":\"x\",\"timestamp\":1}}", 100).is_err());
    }

    #[tokio::test]
    async fn test_load_absent() {
        let store = TableStore::new(MemoryStore::new(), 100);
        assert!(store.load().await.unwrap().is_none());
        assert!(store.load_or_default().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_store_then_load() {
        let store = TableStore::new(MemoryStore::new(), 100);
        let mut table = RankingTable::new();
        table.apply_submit(record("p1", "Alice", 50.0, 1));
        table.apply_submit(record("p2", "Bob", 50.0, 2));

        store.store(&table).await.unwrap();
        let loaded = store.load().await.unwrap().unwrap();

        assert_eq!(loaded.top_n(10), table.top_n(10));
        assert_eq!(loaded.get("p2").unwrap().submitted_at, 2);
    }

    #[tokio::test]
    async fn test_load_corrupt() {
        let kv = MemoryStore::new();
        kv.put(SCORES_KEY, Bytes::from_static(b"[1,2")).await.unwrap();
        let store = TableStore::new(kv, 100);

        let result = store.load().await;
        assert!(matches!(result, Err(StoreError::Corrupt { .. })));
    }

    #[tokio::test]
    async fn test_load_truncates_to_capacity() {
        let mut table = RankingTable::new();
        for i in 0..10 {
            let id = format!("p{i}");
            table.apply_submit(record(&id, &id, i as f64, i));
        }

        let small = TableStore::new(MemoryStore::new(), 3);
        small
            .inner()
            .put(SCORES_KEY, encode_table(&table).unwrap())
            .await
            .unwrap();
        let loaded = small.load().await.unwrap().unwrap();
        assert_eq!(loaded.len(), 3);
        assert_eq!(loaded.top_n(1)[0].player_id.as_str(), "p9");
    }
}
