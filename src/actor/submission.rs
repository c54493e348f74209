//! Validated submissions and submission stamps

use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::ValidationError;
use crate::ranking::{PlayerId, Score, ScoreRecord};

/// A score submission that passed validation
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreSubmission {
    player_id: PlayerId,
    player_name: String,
    score: Score,
}

impl ScoreSubmission {
    /// Validate raw input
    ///
    /// IDs and names must be non-empty; the score must be finite.
    pub fn new(
        player_id: impl Into<String>,
        player_name: impl Into<String>,
        score: f64,
    ) -> Result<Self, ValidationError> {
        let player_id = player_id.into();
        if player_id.is_empty() {
            return Err(ValidationError::MissingPlayerId);
        }

        let player_name = player_name.into();
        if player_name.is_empty() {
            return Err(ValidationError::MissingPlayerName);
        }

        let score = Score::new(score).ok_or(ValidationError::InvalidScore)?;

        Ok(Self {
            player_id: PlayerId::new(player_id),
            player_name,
            score,
        })
    }

    pub fn player_id(&self) -> &PlayerId {
        &self.player_id
    }

    pub fn player_name(&self) -> &str {
        &self.player_name
    }

    pub fn score(&self) -> Score {
        self.score
    }

    /// Turn into a table record stamped at `submitted_at`
    pub fn into_record(self, submitted_at: u64) -> ScoreRecord {
        ScoreRecord::new(self.player_id, self.player_name, self.score, submitted_at)
    }
}

/// Validate a player ID for deletion
pub fn validate_player_id(player_id: &str) -> Result<PlayerId, ValidationError> {
    if player_id.is_empty() {
        return Err(ValidationError::MissingPlayerId);
    }
    Ok(PlayerId::new(player_id))
}

/// Issues strictly increasing submission stamps
///
/// Stamps are wall-clock milliseconds, bumped past the last issued stamp and
/// past the newest stamp already stored, so ordering survives restarts and
/// backward clock steps.
#[derive(Debug, Default)]
pub(crate) struct SubmissionClock {
    last: u64,
}

impl SubmissionClock {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Next stamp, never below `floor + 1`
    pub(crate) fn next(&mut self, floor: Option<u64>) -> u64 {
        self.stamp(now_millis(), floor)
    }

    fn stamp(&mut self, now: u64, floor: Option<u64>) -> u64 {
        let last = self.last.max(floor.unwrap_or(0));
        let stamp = now.max(last.saturating_add(1));
        self.last = stamp;
        stamp
    }
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
