//! Persistence of players, game history, high scores and settings.
//!
//! [`ScoreStore`] is the narrow contract the game depends on. [`Store`]
//! implements it (and the wider operator surface) as four JSON documents on
//! top of any [`BlobStorage`] backend.

mod blob;
mod records;
mod store;

pub use blob::{BlobStorage, MemoryBlobs, StoreFile};
pub use records::{
    GUEST_ID, GUEST_NAME, GameSession, HighScore, Player, PlayerId, PlayerName, StorageStats, UNKNOWN_NAME,
    is_guest_id, sanitize_name, truncated,
};
pub use store::{HistoryList, PlayerList, ScoreList, Store, TierScores};

use crate::difficulty::Difficulty;

/// Storage failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StorageError {
    /// Backend not mounted; nothing is persisted.
    Unavailable,
    /// File does not exist.
    NotFound,
    /// Backend read or write failed.
    Io,
    /// Document does not fit the buffer or the backend slot.
    TooLarge,
    /// Document could not be encoded.
    Encode,
    /// A bounded collection is at capacity.
    Full,
    /// No player with that id.
    PlayerNotFound,
    /// Name empty after sanitizing.
    InvalidName,
}

impl core::fmt::Display for StorageError {
    fn fmt(
        &self,
        f: &mut core::fmt::Formatter<'_>,
    ) -> core::fmt::Result {
        match self {
            Self::Unavailable => write!(f, "Storage unavailable"),
            Self::NotFound => write!(f, "File not found"),
            Self::Io => write!(f, "I/O error"),
            Self::TooLarge => write!(f, "Document too large"),
            Self::Encode => write!(f, "Encode failed"),
            Self::Full => write!(f, "Collection full"),
            Self::PlayerNotFound => write!(f, "Player not found"),
            Self::InvalidName => write!(f, "Invalid player name"),
        }
    }
}

impl core::error::Error for StorageError {}

/// What the game needs from persistence.
pub trait ScoreStore {
    /// Look up a registered player.
    fn get_player(
        &mut self,
        id: &str,
    ) -> Option<Player>;

    /// Persist a finished session and fold it into player stats and high scores.
    ///
    /// Returns the session as stored, with its timestamp and player name filled in.
    fn record_game(
        &mut self,
        session: &GameSession,
        now_ms: u32,
    ) -> Result<GameSession, StorageError>;

    /// Best scores for one tier, highest first, at most `limit` entries.
    fn high_scores(
        &mut self,
        difficulty: Difficulty,
        limit: usize,
    ) -> TierScores;
}
