//! Persisted record types.
//!
//! Every record is stored as a JSON object with camelCase keys. Strings are
//! fixed-capacity `heapless` strings so whole documents decode without an
//! allocator.

use heapless::String;
use serde::{Deserialize, Serialize};

use crate::config::{PLAYER_ID_LEN, PLAYER_NAME_LEN};
use crate::difficulty::Difficulty;

/// Player id, `xxxxxxxx-xxxx-xxxx-xxxx-xxxxxxxxxxxx` for registered players.
pub type PlayerId = String<PLAYER_ID_LEN>;

/// Display name.
pub type PlayerName = String<PLAYER_NAME_LEN>;

/// Id recorded for games played without a registered player.
pub const GUEST_ID: &str = "guest";

/// Name recorded for guest games.
pub const GUEST_NAME: &str = "Guest";

/// Name recorded when a session names a player that is not registered.
pub const UNKNOWN_NAME: &str = "Unknown";

/// Whether an id refers to a guest rather than a registered player.
pub fn is_guest_id(id: &str) -> bool { id.is_empty() || id == GUEST_ID }

/// Copy `s` into a fixed-capacity string, cutting it at a char boundary if needed.
pub fn truncated<const N: usize>(s: &str) -> String<N> {
    let mut out = String::new();
    for ch in s.chars() {
        if out.push(ch).is_err() {
            break;
        }
    }
    out
}

/// Clean up a user-supplied player name.
///
/// Drops control characters, quotes and backslashes, trims surrounding
/// whitespace and cuts the result to [`PLAYER_NAME_LEN`] bytes. Returns
/// `None` if nothing printable is left.
pub fn sanitize_name(raw: &str) -> Option<PlayerName> {
    let mut out = PlayerName::new();
    for ch in raw.trim().chars() {
        if ch.is_control() || ch == '"' || ch == '\\' {
            continue;
        }
        if out.push(ch).is_err() {
            break;
        }
    }

    let trimmed_len = out.trim_end().len();
    out.truncate(trimmed_len);
    if out.is_empty() { None } else { Some(out) }
}

/// A registered player and their running statistics.
#[derive(Clone, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: PlayerId,
    pub name: PlayerName,
    pub games_played: u32,
    pub total_score: u32,
    pub best_score: u16,
    pub wins: u16,
    /// Creation time, unix seconds (or seconds since boot before a clock sync).
    pub created: u32,
}

/// One finished game (or one player's turn in pass-and-play).
#[derive(Clone, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSession {
    pub player_id: PlayerId,
    pub player_name: PlayerName,
    pub score: u16,
    pub difficulty: Difficulty,
    /// Unix seconds, filled in by the store.
    pub timestamp: u32,
    /// Seconds from game start to the end of this session.
    pub duration: u32,
}

/// Entry in the high score table.
#[derive(Clone, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HighScore {
    pub player_id: PlayerId,
    pub player_name: PlayerName,
    pub score: u16,
    pub difficulty: Difficulty,
    pub timestamp: u32,
}

impl From<&GameSession> for HighScore {
    fn from(session: &GameSession) -> Self {
        Self {
            player_id: session.player_id.clone(),
            player_name: session.player_name.clone(),
            score: session.score,
            difficulty: session.difficulty,
            timestamp: session.timestamp,
        }
    }
}

/// Backend usage figures.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageStats {
    pub total_bytes: u32,
    pub used_bytes: u32,
}

impl StorageStats {
    pub const fn free_bytes(&self) -> u32 { self.total_bytes.saturating_sub(self.used_bytes) }
}
