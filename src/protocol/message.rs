//! JSON message types
//!
//! Websocket frames are tagged by a `type` field:
//!
//! ```text
//! server -> client  {"type":"update","leaderboard":[{rank,playerId,playerName,score}, ...]}
//! client -> server  {"type":"submit","playerId":"p1","playerName":"Alice","score":100}
//! ```
//!
//! HTTP bodies reuse the same field names.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::actor::ScoreSubmission;
use crate::error::ValidationError;
use crate::ranking::LeaderboardEntry;

/// Score submission body, validated into a [`ScoreSubmission`]
///
/// Fields are optional here so that a missing field is reported as a
/// validation failure rather than a decode failure.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitRequest {
    #[serde(default)]
    pub player_id: Option<Value>,
    #[serde(default)]
    pub player_name: Option<String>,
    #[serde(default)]
    pub score: Option<Value>,
}

impl SubmitRequest {
    /// Validate the request
    pub fn validate(self) -> Result<ScoreSubmission, ValidationError> {
        let score = match self.score {
            Some(Value::Number(n)) => n.as_f64().ok_or(ValidationError::InvalidScore)?,
            _ => return Err(ValidationError::InvalidScore),
        };

        ScoreSubmission::new(
            player_id_key(self.player_id.as_ref()).unwrap_or_default(),
            self.player_name.unwrap_or_default(),
            score,
        )
    }
}

/// Player deletion body
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteRequest {
    #[serde(default)]
    pub player_id: Option<Value>,
}

impl DeleteRequest {
    /// Player key, `None` if missing or empty
    pub fn player_id(&self) -> Option<String> {
        player_id_key(self.player_id.as_ref())
    }
}

/// Map a JSON `playerId` to its table key
///
/// Strings are used as-is and numbers by their canonical decimal form, so
/// `123` and `"123"` address the same player. `null`, `false`, `0`, `""`
/// and non-scalar values count as missing.
pub fn player_id_key(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                (i != 0).then(|| i.to_string())
            } else if let Some(u) = n.as_u64() {
                Some(u.to_string())
            } else {
                let f = n.as_f64()?;
                if f == 0.0 || !f.is_finite() {
                    None
                } else if f.fract() == 0.0 && f.abs() < 9_007_199_254_740_992.0 {
                    Some((f as i64).to_string())
                } else {
                    Some(f.to_string())
                }
            }
        }
        _ => None,
    }
}

/// Message received from a websocket client
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ClientMessage {
    Submit(SubmitRequest),
}

/// Message pushed to websocket clients
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ServerMessage {
    Update { leaderboard: Vec<LeaderboardEntry> },
}

/// `{success: true}` acknowledgement
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuccessResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl SuccessResponse {
    pub fn ok() -> Self {
        Self {
            success: true,
            message: None,
        }
    }

    pub fn with_message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
        }
    }
}

/// Query response body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaderboardResponse {
    pub leaderboard: Vec<LeaderboardEntry>,
}

/// Failure body for server-side errors
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
