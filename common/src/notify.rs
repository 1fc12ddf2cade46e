//! Game events for remote observers.
//!
//! Events are flat JSON objects tagged by `type`, e.g.
//!
//! ```text
//! {"type":"buttonPress","color":"Red","correct":true}
//! ```
//!
//! Publishing is fire-and-forget: a sink may drop events and the game never
//! waits on one.

use heapless::Vec;
use serde::Serialize;

use crate::colors::Color;
use crate::config::{MAX_MATCH_PLAYERS, MAX_SEQUENCE_LENGTH};
use crate::game::{GameMode, GameState, PlayerScore};
use crate::storage::{PlayerId, PlayerName};

/// Buffer size that fits any encoded [`GameEvent`].
pub const MAX_EVENT_JSON: usize = 768;

#[derive(Clone, PartialEq, Eq, Debug, Serialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum GameEvent {
    /// Current game status.
    GameState {
        state: GameState,
        score: u16,
        high_score: u16,
        difficulty: &'static str,
        is_active: bool,
    },
    /// Sequence about to be played back.
    Sequence { colors: Vec<Color, MAX_SEQUENCE_LENGTH> },
    /// A validated press.
    ButtonPress { color: Color, correct: bool },
    /// Single-player game ended. `high_score` is set for a new record.
    GameOver { score: u16, high_score: bool },
    /// Pass-and-play roster update.
    Multiplayer {
        game_mode: GameMode,
        current_player_index: u8,
        current_player_id: PlayerId,
        current_player_name: PlayerName,
        players: Vec<PlayerScore, MAX_MATCH_PLAYERS>,
    },
    /// The selected single-player profile changed.
    PlayerChange { player_id: PlayerId, player_name: PlayerName },
}

impl GameEvent {
    /// The `type` tag.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::GameState { .. } => "gameState",
            Self::Sequence { .. } => "sequence",
            Self::ButtonPress { .. } => "buttonPress",
            Self::GameOver { .. } => "gameOver",
            Self::Multiplayer { .. } => "multiplayer",
            Self::PlayerChange { .. } => "playerChange",
        }
    }

    /// Encode as JSON into `buf`.
    pub fn to_json<'a>(
        &self,
        buf: &'a mut [u8],
    ) -> Result<&'a str, serde_json_core::ser::Error> {
        let len = serde_json_core::to_slice(self, buf)?;
        // serde-json-core only ever writes UTF-8
        core::str::from_utf8(&buf[..len]).map_err(|_| serde_json_core::ser::Error::BufferFull)
    }
}

/// Receiver of game events.
pub trait EventSink {
    fn publish(
        &mut self,
        event: &GameEvent,
    );
}

/// Discards every event.
impl EventSink for () {
    fn publish(
        &mut self,
        _event: &GameEvent,
    ) {
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
