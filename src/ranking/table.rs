//! Ranking table implementation
//!
//! Pure ranking logic: merge a submission, remove a player, and cut the
//! ordered top-N. No I/O happens here; the actor loads a table, applies one
//! operation and persists the result.

use std::collections::HashMap;

use super::record::{LeaderboardEntry, PlayerId, ScoreRecord};

/// Default maximum number of players kept in the table
pub const DEFAULT_CAPACITY: usize = 100;

/// Result of merging a submission into the table
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// New player entered the table, possibly pushing the lowest one out
    Inserted {
        /// Player removed by the capacity cut
        evicted: Option<PlayerId>,
    },
    /// Existing record was fully replaced
    Replaced,
    /// Table was full and the submission ranked below every entry.
    /// The table is left exactly as it was.
    Dropped,
}

impl SubmitOutcome {
    /// Whether the table changed
    pub fn is_applied(&self) -> bool {
        !matches!(self, SubmitOutcome::Dropped)
    }
}

/// Capacity-bounded mapping from player to score record
///
/// Invariants: at most `capacity` records, at most one record per player.
#[derive(Debug, Clone)]
pub struct RankingTable {
    records: HashMap<PlayerId, ScoreRecord>,
    capacity: usize,
}

impl RankingTable {
    /// Create an empty table with the default capacity
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Create an empty table with the given capacity (at least 1)
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            records: HashMap::new(),
            capacity: capacity.max(1),
        }
    }

    /// Build a table from stored records
    ///
    /// Duplicate players keep the last record seen. If there are more records
    /// than `capacity`, only the best ranked ones are kept.
    pub fn from_records(records: impl IntoIterator<Item = ScoreRecord>, capacity: usize) -> Self {
        let mut table = Self::with_capacity(capacity);
        for record in records {
            table.records.insert(record.player_id.clone(), record);
        }

        if table.records.len() > table.capacity {
            let keep: Vec<PlayerId> = table
                .ranked()
                .into_iter()
                .take(table.capacity)
                .map(|r| r.player_id.clone())
                .collect();
            let mut kept = HashMap::with_capacity(keep.len());
            for id in keep {
                if let Some(record) = table.records.remove(&id) {
                    kept.insert(id, record);
                }
            }
            table.records = kept;
        }

        table
    }

    /// Maximum number of records
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if the table has no records
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Look up a player's record
    pub fn get(&self, player_id: &str) -> Option<&ScoreRecord> {
        self.records.get(player_id)
    }

    /// Check if a player is in the table
    pub fn contains(&self, player_id: &str) -> bool {
        self.records.contains_key(player_id)
    }

    /// Newest submission stamp in the table
    pub fn latest_submission(&self) -> Option<u64> {
        self.records.values().map(|r| r.submitted_at).max()
    }

    /// All records in rank order
    pub fn ranked(&self) -> Vec<&ScoreRecord> {
        let mut records: Vec<&ScoreRecord> = self.records.values().collect();
        records.sort_by(|a, b| a.rank_cmp(b));
        records
    }

    /// Insert or fully replace a player's record, then enforce capacity
    pub fn apply_submit(&mut self, record: ScoreRecord) -> SubmitOutcome {
        let player_id = record.player_id.clone();

        if self.records.insert(player_id.clone(), record).is_some() {
            // Replacing never grows the table
            return SubmitOutcome::Replaced;
        }

        if self.records.len() <= self.capacity {
            return SubmitOutcome::Inserted { evicted: None };
        }

        let lowest = self
            .records
            .values()
            .max_by(|a, b| a.rank_cmp(b))
            .map(|r| r.player_id.clone());

        match lowest {
            Some(lowest) if lowest == player_id => {
                self.records.remove(&player_id);
                SubmitOutcome::Dropped
            }
            Some(lowest) => {
                self.records.remove(&lowest);
                SubmitOutcome::Inserted {
                    evicted: Some(lowest),
                }
            }
            None => SubmitOutcome::Inserted { evicted: None },
        }
    }

    /// Remove a player's record
    ///
    /// Returns whether a record was removed. Removing an absent player is a
    /// no-op.
    pub fn apply_delete(&mut self, player_id: &str) -> bool {
        self.records.remove(player_id).is_some()
    }

    /// The first `n` records in rank order, with 1-based ranks
    pub fn top_n(&self, n: usize) -> Vec<LeaderboardEntry> {
        self.ranked()
            .into_iter()
            .take(n)
            .enumerate()
            .map(|(index, record)| LeaderboardEntry {
                rank: index + 1,
                player_id: record.player_id.clone(),
                player_name: record.player_name.clone(),
                score: record.score,
            })
            .collect()
    }
}

impl Default for RankingTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ranking::record::Score;

    fn record(id: &str, name: &str, score: f64, at: u64) -> ScoreRecord {
        ScoreRecord::new(PlayerId::new(id), name, Score::new(score).unwrap(), at)
    }

    fn full_table(capacity: usize) -> RankingTable {
        let mut table = RankingTable::with_capacity(capacity);
        for i in 0..capacity {
            let id = format!("p{i}");
            table.apply_submit(record(&id, &id, 100.0 + i as f64, i as u64));
        }
        table
    }

    #[test]
    fn test_empty_table() {
        let table = RankingTable::new();
        assert!(table.is_empty());
        assert_eq!(table.capacity(), DEFAULT_CAPACITY);
        assert!(table.top_n(10).is_empty());
        assert_eq!(table.latest_submission(), None);
    }

    #[test]
    fn test_submit_and_top_n() {
        let mut table = RankingTable::new();
        let outcome = table.apply_submit(record("p1", "Alice", 100.0, 1));
        assert_eq!(outcome, SubmitOutcome::Inserted { evicted: None });

        let top = table.top_n(1);
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].rank, 1);
        assert_eq!(top[0].player_id.as_str(), "p1");
        assert_eq!(top[0].player_name, "Alice");
        assert_eq!(top[0].score.value(), 100.0);
    }

    #[test]
    fn test_sorted_descending_by_score() {
        let mut table = RankingTable::new();
        table.apply_submit(record("a", "A", 10.0, 1));
        table.apply_submit(record("b", "B", 30.0, 2));
        table.apply_submit(record("c", "C", 20.0, 3));

        let ids: Vec<String> = table
            .top_n(10)
            .into_iter()
            .map(|e| e.player_id.to_string())
            .collect();
        assert_eq!(ids, vec!["b", "c", "a"]);

        let ranks: Vec<usize> = table.top_n(10).iter().map(|e| e.rank).collect();
        assert_eq!(ranks, vec![1, 2, 3]);
    }

    #[test]
    fn test_tie_break_earlier_submission_wins() {
        let mut table = RankingTable::new();
        table.apply_submit(record("p2", "Bob", 50.0, 2));
        table.apply_submit(record("p1", "Alice", 50.0, 1));

        let top = table.top_n(2);
        assert_eq!(top[0].player_id.as_str(), "p1");
        assert_eq!(top[0].rank, 1);
        assert_eq!(top[1].player_id.as_str(), "p2");
        assert_eq!(top[1].rank, 2);
    }

    #[test]
    fn test_resubmit_replaces_record() {
        let mut table = RankingTable::new();
        table.apply_submit(record("p1", "Alice", 10.0, 1));
        table.apply_submit(record("p2", "Bob", 20.0, 2));

        let outcome = table.apply_submit(record("p1", "Alicia", 30.0, 3));
        assert_eq!(outcome, SubmitOutcome::Replaced);
        assert_eq!(table.len(), 2);

        let top = table.top_n(2);
        assert_eq!(top[0].player_id.as_str(), "p1");
        assert_eq!(top[0].player_name, "Alicia");
        assert_eq!(top[0].score.value(), 30.0);
    }

    #[test]
    fn test_resubmit_lower_score_drops_rank() {
        let mut table = RankingTable::new();
        table.apply_submit(record("p1", "Alice", 90.0, 1));
        table.apply_submit(record("p2", "Bob", 50.0, 2));
        table.apply_submit(record("p1", "Alice", 5.0, 3));

        let top = table.top_n(2);
        assert_eq!(top[0].player_id.as_str(), "p2");
        assert_eq!(top[1].player_id.as_str(), "p1");
        assert_eq!(top[1].score.value(), 5.0);
    }

    #[test]
    fn test_capacity_bound() {
        let mut table = RankingTable::with_capacity(5);
        for i in 0..20 {
            let id = format!("p{i}");
            table.apply_submit(record(&id, &id, i as f64, i as u64));
            assert!(table.len() <= 5);
        }

        let ids: Vec<String> = table
            .top_n(5)
            .into_iter()
            .map(|e| e.player_id.to_string())
            .collect();
        assert_eq!(ids, vec!["p19", "p18", "p17", "p16", "p15"]);
    }

    #[test]
    fn test_capacity_drops_lowest_newcomer() {
        let mut table = full_table(DEFAULT_CAPACITY);
        let before = table.top_n(DEFAULT_CAPACITY);

        let outcome = table.apply_submit(record("late", "Late", 1.0, 1_000));
        assert_eq!(outcome, SubmitOutcome::Dropped);
        assert!(!outcome.is_applied());
        assert!(!table.contains("late"));
        assert_eq!(table.len(), DEFAULT_CAPACITY);
        assert_eq!(table.top_n(DEFAULT_CAPACITY), before);
    }

    #[test]
    fn test_capacity_equal_score_newcomer_loses_tie() {
        let mut table = full_table(3);
        // p0 holds the lowest score (100) with the earliest stamp
        let outcome = table.apply_submit(record("late", "Late", 100.0, 50));
        assert_eq!(outcome, SubmitOutcome::Dropped);
        assert!(table.contains("p0"));
    }

    #[test]
    fn test_capacity_evicts_lowest() {
        let mut table = full_table(3);
        let outcome = table.apply_submit(record("star", "Star", 500.0, 10));

        assert_eq!(
            outcome,
            SubmitOutcome::Inserted {
                evicted: Some(PlayerId::new("p0"))
            }
        );
        assert!(table.get("p0").is_none());
        assert_eq!(table.top_n(1)[0].player_id.as_str(), "star");
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn test_delete() {
        let mut table = RankingTable::new();
        table.apply_submit(record("p1", "Alice", 10.0, 1));

        assert!(table.apply_delete("p1"));
        assert!(table.top_n(10).is_empty());
    }

    #[test]
    fn test_delete_absent_is_idempotent() {
        let mut table = RankingTable::new();
        table.apply_submit(record("p1", "Alice", 10.0, 1));

        assert!(!table.apply_delete("ghost"));
        assert!(!table.apply_delete("ghost"));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_from_records_truncates_to_capacity() {
        let records = (0..10).map(|i| {
            let id = format!("p{i}");
            record(&id, &id, i as f64, i as u64)
        });
        let table = RankingTable::from_records(records, 4);

        assert_eq!(table.len(), 4);
        assert!(table.contains("p9"));
        assert!(!table.contains("p5"));
    }

    #[test]
    fn test_top_n_deterministic() {
        let mut a = RankingTable::new();
        let mut b = RankingTable::new();
        for (id, at) in [("x", 1), ("y", 1), ("z", 1)] {
            a.apply_submit(record(id, id, 7.0, at));
        }
        for (id, at) in [("z", 1), ("x", 1), ("y", 1)] {
            b.apply_submit(record(id, id, 7.0, at));
        }

        assert_eq!(a.top_n(3), b.top_n(3));
    }

    #[test]
    fn test_latest_submission() {
        let mut table = RankingTable::new();
        table.apply_submit(record("a", "A", 1.0, 40));
        table.apply_submit(record("b", "B", 2.0, 12));
        assert_eq!(table.latest_submission(), Some(40));
    }
}
