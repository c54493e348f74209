//! Score record types
//!
//! This module defines the key type for identifying players, the validated
//! score value, and the records kept in (and derived from) the ranking table.

use std::borrow::Borrow;
use std::cmp::Ordering;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

/// Largest integer an `f64` represents exactly (2^53)
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

/// Opaque unique identifier of a player
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(String);

impl PlayerId {
    /// Create a new player ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for PlayerId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A finite score value, higher is better
///
/// `NaN` and infinities cannot be represented, so comparisons between
/// scores are always total.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Score(f64);

impl Score {
    /// Create a score, returning `None` for `NaN` or infinite input
    pub fn new(value: f64) -> Option<Self> {
        value.is_finite().then_some(Self(value))
    }

    /// Get the raw value
    pub fn value(self) -> f64 {
        self.0
    }

    /// Compare two scores in ascending numeric order
    pub fn cmp_value(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl std::fmt::Display for Score {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for Score {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        // Integral scores go out as integers so clients see `100`, not `100.0`
        if self.0.fract() == 0.0 && self.0.abs() < MAX_EXACT_INTEGER {
            serializer.serialize_i64(self.0 as i64)
        } else {
            serializer.serialize_f64(self.0)
        }
    }
}

impl<'de> Deserialize<'de> for Score {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = f64::deserialize(deserializer)?;
        Score::new(value).ok_or_else(|| de::Error::custom("score must be a finite number"))
    }
}

/// One player's entry in the ranking table
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreRecord {
    /// Player key, immutable
    pub player_id: PlayerId,
    /// Display name, may change on resubmission
    pub player_name: String,
    /// Submitted score
    pub score: Score,
    /// Submission stamp in milliseconds, used only to break ties
    pub submitted_at: u64,
}

impl ScoreRecord {
    /// Create a new record
    pub fn new(
        player_id: PlayerId,
        player_name: impl Into<String>,
        score: Score,
        submitted_at: u64,
    ) -> Self {
        Self {
            player_id,
            player_name: player_name.into(),
            score,
            submitted_at,
        }
    }

    /// Ranking comparator
    ///
    /// `Less` means `self` ranks above `other`: higher score first, then the
    /// earlier submission, then player ID so the order never depends on map
    /// iteration.
    pub fn rank_cmp(&self, other: &Self) -> Ordering {
        other
            .score
            .cmp_value(&self.score)
            .then_with(|| self.submitted_at.cmp(&other.submitted_at))
            .then_with(|| self.player_id.cmp(&other.player_id))
    }
}

/// A ranked row produced for presentation, never stored
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    /// 1-based position in rank order
    pub rank: usize,
    pub player_id: PlayerId,
    pub player_name: String,
    pub score: Score,
}
