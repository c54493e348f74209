//! Ranking engine
//!
//! Pure logic that keeps the global score table ordered and bounded:
//!
//! - Sort order is score descending, then submission time ascending, so an
//!   earlier submission of an equal score ranks higher
//! - The table never holds more than its capacity; the lowest ranked record
//!   is cut after every insert
//! - Presentation rows (`LeaderboardEntry`) are derived on demand and never
//!   stored

pub mod record;
pub mod table;

pub use record::{LeaderboardEntry, PlayerId, Score, ScoreRecord};
pub use table::{RankingTable, SubmitOutcome, DEFAULT_CAPACITY};
