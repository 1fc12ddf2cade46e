//! The Simon Says state machine.
//!
//! [`SimonGame`] owns its hardware ports, its store and its event sink, and
//! is driven by calling [`SimonGame::tick`] every few milliseconds with the
//! current uptime. Each tick polls the buttons once and dispatches on the
//! current [`GameState`]; every handler returns the state to move to, if any.
//!
//! Nothing here sleeps. Sequence playback, press feedback, pauses and dwell
//! times are deadlines compared against `now_ms`; button edges that arrive
//! while the game is showing something are ignored.
//!
//! # Game flow
//!
//! ```text
//! Idle --press--> ShowingSequence --done--> WaitingInput --last step--> InputCorrect
//!                      ^                       |                            |
//!                      +----------next round---+----------------------------+
//!                                              |
//!                                   wrong/timeout
//!                                              v
//!            GameOver <--(HighScore)-- InputWrong --next player--> ShowingSequence
//! ```

mod playback;
mod sequence;

use core::fmt::Write;

use heapless::{Deque, Vec};
use log::{debug, info, warn};
use serde::Serialize;

pub use playback::{Playback, PlaybackStep};
pub use sequence::Sequence;

use self::playback::reached;
use crate::button::ButtonHandler;
use crate::colors::Color;
use crate::config::{
    GAME_OVER_DWELL_MS, HIGH_SCORE_DWELL_MS, MAX_MATCH_PLAYERS, MAX_QUEUED_PRESSES, MIN_MATCH_PLAYERS, ROUND_PAUSE_MS, TURN_HANDOFF_MS,
};
use crate::difficulty::{DEFAULT_DIFFICULTY, Difficulty, NUM_DIFFICULTIES};
use crate::hal::{ButtonInput, LedAnimation, LedOutput, Melody, ToneOutput};
use crate::notify::{EventSink, GameEvent};
use crate::rng::Rng;
use crate::settings::GameSettings;
use crate::storage::{GUEST_ID, GUEST_NAME, GameSession, PlayerId, PlayerName, ScoreStore, truncated};

// =============================================================================
// Public Types
// =============================================================================

/// Game state. Serialized as its number for remote observers.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[serde(into = "u8")]
#[repr(u8)]
pub enum GameState {
    /// Waiting for a press to start.
    Idle = 0,
    ShowingSequence = 1,
    WaitingInput = 2,
    /// Round completed.
    InputCorrect = 3,
    /// Wrong press or timeout.
    InputWrong = 4,
    GameOver = 5,
    /// New record celebration, on the way to `GameOver`.
    HighScore = 6,
}

impl GameState {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::ShowingSequence => "ShowingSequence",
            Self::WaitingInput => "WaitingInput",
            Self::InputCorrect => "InputCorrect",
            Self::InputWrong => "InputWrong",
            Self::GameOver => "GameOver",
            Self::HighScore => "HighScore",
        }
    }
}

impl From<GameState> for u8 {
    fn from(state: GameState) -> Self { state as u8 }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Serialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[serde(into = "u8")]
#[repr(u8)]
pub enum GameMode {
    #[default]
    SinglePlayer = 0,
    /// Players take turns on the same sequence, each until they fail.
    PassAndPlay = 1,
}

impl From<GameMode> for u8 {
    fn from(mode: GameMode) -> Self { mode as u8 }
}

/// One participant of a pass-and-play match.
#[derive(Clone, PartialEq, Eq, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerScore {
    #[serde(rename = "id")]
    pub player_id: PlayerId,
    #[serde(rename = "name")]
    pub player_name: PlayerName,
    pub score: u16,
    /// Turn is over.
    pub has_played: bool,
}

/// A press being shown back to the player; it is judged once the tone ends.
#[derive(Clone, Copy, Debug)]
struct PressFeedback {
    color: Color,
    correct: bool,
    until_ms: u32,
}

// =============================================================================
// Game
// =============================================================================

pub struct SimonGame<I, L, T, S, E> {
    input: I,
    leds: L,
    speaker: T,
    store: S,
    sink: E,

    buttons: ButtonHandler,
    rng: Rng,

    state: GameState,
    state_entered_ms: u32,
    difficulty: Difficulty,
    mode: GameMode,

    sequence: Sequence,
    playback: Playback,
    /// Extra pause before the next playback's lead-in.
    pending_pause_ms: u32,
    feedback: Option<PressFeedback>,
    /// Presses made while an earlier press was still lit, oldest first.
    queued_presses: Deque<Color, MAX_QUEUED_PRESSES>,

    step: usize,
    score: u16,
    high_scores: [u16; NUM_DIFFICULTIES],
    last_input_ms: u32,
    /// Start of the game or pass-and-play match; session durations count from here.
    match_start_ms: u32,

    /// Player credited in single-player games; empty for guest.
    current_player_id: PlayerId,
    roster: Vec<PlayerScore, MAX_MATCH_PLAYERS>,
    current_player: usize,
}

impl<I, L, T, S, E> SimonGame<I, L, T, S, E>
where
    I: ButtonInput,
    L: LedOutput,
    T: ToneOutput,
    S: ScoreStore,
    E: EventSink,
{
    /// Assemble a game. `seed` drives sequence generation.
    pub fn new(
        input: I,
        leds: L,
        speaker: T,
        store: S,
        sink: E,
        seed: u32,
    ) -> Self {
        Self {
            input,
            leds,
            speaker,
            store,
            sink,
            buttons: ButtonHandler::new(),
            rng: Rng::new(seed),
            state: GameState::Idle,
            state_entered_ms: 0,
            difficulty: DEFAULT_DIFFICULTY,
            mode: GameMode::SinglePlayer,
            sequence: Sequence::new(),
            playback: Playback::new(),
            pending_pause_ms: 0,
            feedback: None,
            queued_presses: Deque::new(),
            step: 0,
            score: 0,
            high_scores: [0; NUM_DIFFICULTIES],
            last_input_ms: 0,
            match_start_ms: 0,
            current_player_id: PlayerId::new(),
            roster: Vec::new(),
            current_player: 0,
        }
    }

    /// Load high scores and go idle.
    pub fn begin(
        &mut self,
        now_ms: u32,
    ) {
        info!("[GAME] Initializing, difficulty {}", self.difficulty.name());
        self.load_high_scores();
        self.set_state(GameState::Idle, now_ms);
    }

    /// Apply stored settings to the game and its outputs.
    pub fn apply_settings(
        &mut self,
        settings: &GameSettings,
    ) {
        let settings = settings.sanitized();
        self.set_difficulty(settings.difficulty);
        self.speaker.set_volume(settings.volume);
        self.speaker.set_muted(!settings.sound_enabled);
        self.leds.set_brightness(settings.led_brightness);
    }

    /// Advance the game to `now_ms`. Call every ~10 ms.
    pub fn tick(
        &mut self,
        now_ms: u32,
    ) {
        self.buttons.update(&mut self.input, now_ms);

        let next = match self.state {
            GameState::Idle => self.handle_idle(now_ms),
            GameState::ShowingSequence => self.handle_showing_sequence(now_ms),
            GameState::WaitingInput => self.handle_waiting_input(now_ms),
            GameState::InputCorrect => self.handle_input_correct(now_ms),
            GameState::InputWrong => self.handle_input_wrong(now_ms),
            GameState::GameOver => self.handle_game_over(now_ms),
            GameState::HighScore => self.handle_high_score(now_ms),
        };

        if let Some(next) = next {
            self.set_state(next, now_ms);
        }
    }

    // =========================================================================
    // Commands
    // =========================================================================

    /// Start a single-player game.
    pub fn start_game(
        &mut self,
        difficulty: Difficulty,
        now_ms: u32,
    ) {
        info!("[GAME] Starting new game");
        self.speaker.play_melody(Melody::GameStart);
        self.set_difficulty(difficulty);

        self.mode = GameMode::SinglePlayer;
        self.roster.clear();
        self.current_player = 0;
        self.new_match(now_ms);

        self.set_state(GameState::ShowingSequence, now_ms);
        self.publish_game_state();
    }

    /// Start a pass-and-play match for 2 to 4 players.
    ///
    /// Any other roster size is rejected and the game is left untouched.
    pub fn start_multiplayer_game(
        &mut self,
        player_ids: &[&str],
        difficulty: Difficulty,
        now_ms: u32,
    ) -> bool {
        if !(MIN_MATCH_PLAYERS..=MAX_MATCH_PLAYERS).contains(&player_ids.len()) {
            warn!(
                "[GAME] Invalid number of players: {} ({}-{} required)",
                player_ids.len(),
                MIN_MATCH_PLAYERS,
                MAX_MATCH_PLAYERS
            );
            return false;
        }

        info!("[GAME] Starting pass-and-play match, {} players", player_ids.len());
        self.roster.clear();
        for (index, id) in player_ids.iter().enumerate() {
            let player_name = match self.store.get_player(id) {
                Some(player) => player.name,
                None => fallback_name(index),
            };
            debug!("[GAME] Player {}: {} ({})", index + 1, player_name, id);

            let entry = PlayerScore {
                player_id: truncated(id),
                player_name,
                ..PlayerScore::default()
            };
            if self.roster.push(entry).is_err() {
                break;
            }
        }

        self.start_match(difficulty, now_ms);
        true
    }

    /// Abandon any game and go idle.
    pub fn reset(
        &mut self,
        now_ms: u32,
    ) {
        info!("[GAME] Resetting to idle");
        self.mode = GameMode::SinglePlayer;
        self.roster.clear();
        self.current_player = 0;
        self.set_state(GameState::Idle, now_ms);
        self.publish_game_state();
    }

    pub fn set_difficulty(
        &mut self,
        difficulty: Difficulty,
    ) {
        self.difficulty = difficulty;
        debug!("[GAME] Difficulty set to {}", difficulty.name());
    }

    /// Set the difficulty from a raw tier index. Unknown indices are ignored.
    pub fn set_difficulty_index(
        &mut self,
        index: usize,
    ) -> bool {
        match Difficulty::try_from_index(index) {
            Some(difficulty) => {
                self.set_difficulty(difficulty);
                true
            }
            None => {
                warn!("[GAME] Ignoring unknown difficulty {index}");
                false
            }
        }
    }

    /// Select the registered player credited with single-player games. Empty for guest.
    pub fn set_current_player(
        &mut self,
        player_id: &str,
    ) {
        self.current_player_id = truncated(player_id);
        info!("[GAME] Current player set to {}", self.current_player_id);

        let player_name = match self.store.get_player(player_id) {
            Some(player) => player.name,
            None => truncated(GUEST_NAME),
        };
        let event = GameEvent::PlayerChange {
            player_id: self.current_player_id.clone(),
            player_name,
        };
        self.sink.publish(&event);
        self.publish_game_state();
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    #[inline]
    pub const fn state(&self) -> GameState { self.state }

    #[inline]
    pub const fn score(&self) -> u16 { self.score }

    /// Best score at the current difficulty.
    #[inline]
    pub fn high_score(&self) -> u16 { self.high_scores[self.difficulty.index()] }

    #[inline]
    pub fn high_score_for(
        &self,
        difficulty: Difficulty,
    ) -> u16 {
        self.high_scores[difficulty.index()]
    }

    #[inline]
    pub const fn difficulty(&self) -> Difficulty { self.difficulty }

    /// A game is in progress (neither idle nor over).
    #[inline]
    pub fn is_active(&self) -> bool { !matches!(self.state, GameState::Idle | GameState::GameOver) }

    #[inline]
    pub const fn game_mode(&self) -> GameMode { self.mode }

    /// Id of the player whose turn it is; empty for a guest.
    pub fn current_player(&self) -> &str {
        match self.mode {
            GameMode::SinglePlayer => &self.current_player_id,
            GameMode::PassAndPlay => self
                .roster
                .get(self.current_player)
                .map_or("", |p| p.player_id.as_str()),
        }
    }

    #[inline]
    pub const fn current_player_index(&self) -> usize { self.current_player }

    /// Pass-and-play roster; empty in single-player.
    #[inline]
    pub fn players(&self) -> &[PlayerScore] { &self.roster }

    /// Colors in play this round.
    #[inline]
    pub fn sequence(&self) -> &[Color] { self.sequence.as_slice() }

    /// Index of the next expected press.
    #[inline]
    pub const fn step(&self) -> usize { self.step }

    /// Debounced buttons as of the last tick.
    #[inline]
    pub const fn buttons(&self) -> &ButtonHandler { &self.buttons }

    pub fn input_mut(&mut self) -> &mut I { &mut self.input }

    pub fn leds(&self) -> &L { &self.leds }

    pub fn leds_mut(&mut self) -> &mut L { &mut self.leds }

    pub fn speaker(&self) -> &T { &self.speaker }

    pub fn speaker_mut(&mut self) -> &mut T { &mut self.speaker }

    pub fn store_mut(&mut self) -> &mut S { &mut self.store }

    pub fn sink(&self) -> &E { &self.sink }

    pub fn sink_mut(&mut self) -> &mut E { &mut self.sink }

    // =========================================================================
    // State Handlers
    // =========================================================================

    fn handle_idle(
        &mut self,
        now_ms: u32,
    ) -> Option<GameState> {
        if self.buttons.just_pressed().is_some() {
            info!("[GAME] Button pressed, starting game");
            self.start_game(self.difficulty, now_ms);
        }
        None
    }

    fn handle_showing_sequence(
        &mut self,
        now_ms: u32,
    ) -> Option<GameState> {
        let timing = self.difficulty.settings();
        match self.playback.poll(now_ms, &self.sequence, timing)? {
            PlaybackStep::Announce => {
                debug!("[GAME] Playing sequence of {}", self.sequence.len());
                let colors = Vec::from_slice(self.sequence.as_slice()).unwrap_or_default();
                self.sink.publish(&GameEvent::Sequence { colors });
                None
            }
            PlaybackStep::Show(color) => {
                debug!("[GAME] Step {}: {}", self.playback.step() + 1, color.name());
                self.leds.on(color);
                self.speaker.start_tone(color.tone_hz());
                None
            }
            PlaybackStep::Hide(color) => {
                self.leds.off(color);
                self.speaker.stop_tone();
                None
            }
            PlaybackStep::Finished => Some(GameState::WaitingInput),
        }
    }

    fn handle_waiting_input(
        &mut self,
        now_ms: u32,
    ) -> Option<GameState> {
        if let Some(feedback) = self.feedback {
            // The edge is gone after this tick, keep the press for later
            if let Some(color) = self.buttons.just_pressed() {
                if self.queued_presses.push_back(color).is_err() {
                    warn!("[GAME] Press queue full, dropping {}", color.name());
                }
            }
            if !reached(now_ms, feedback.until_ms) {
                return None;
            }
            self.feedback = None;
            self.leds.off(feedback.color);
            self.speaker.stop_tone();

            if !feedback.correct {
                return Some(GameState::InputWrong);
            }
            if self.step >= self.sequence.len() {
                info!("[GAME] Sequence complete");
                return Some(GameState::InputCorrect);
            }
            // Each press gets a full window, starting after its feedback
            self.last_input_ms = now_ms;
        }

        let timing = self.difficulty.settings();
        if now_ms.wrapping_sub(self.last_input_ms) > u32::from(timing.timing_window_ms) {
            info!("[GAME] Input timeout");
            return Some(GameState::InputWrong);
        }

        let color = self.queued_presses.pop_front().or_else(|| self.buttons.just_pressed())?;
        let correct = self.sequence.matches(self.step, color);
        debug!(
            "[GAME] Pressed {} at step {}: {}",
            color.name(),
            self.step + 1,
            if correct { "correct" } else { "wrong" }
        );
        if correct {
            self.step += 1;
        }
        self.sink.publish(&GameEvent::ButtonPress { color, correct });

        self.leds.on(color);
        self.speaker.start_tone(color.tone_hz());
        self.feedback = Some(PressFeedback {
            color,
            correct,
            until_ms: now_ms.wrapping_add(u32::from(timing.tone_duration_ms)),
        });
        None
    }

    fn handle_input_correct(
        &mut self,
        now_ms: u32,
    ) -> Option<GameState> {
        self.score = self.score.saturating_add(1);
        info!("[GAME] Score: {}", self.score);

        if self.mode == GameMode::PassAndPlay {
            if let Some(player) = self.roster.get_mut(self.current_player) {
                player.score = self.score;
            }
            self.publish_multiplayer();
        }

        let max_len = usize::from(self.difficulty.settings().max_length);
        if self.sequence.len() >= max_len {
            info!("[GAME] Maximum length reached");
            return Some(match self.mode {
                GameMode::SinglePlayer => self.finish_single(now_ms),
                GameMode::PassAndPlay => self.end_turn(now_ms),
            });
        }

        let reuse = self.mode == GameMode::PassAndPlay;
        self.sequence.extend(&mut self.rng, max_len, reuse);
        self.pending_pause_ms = ROUND_PAUSE_MS;
        Some(GameState::ShowingSequence)
    }

    fn handle_input_wrong(
        &mut self,
        now_ms: u32,
    ) -> Option<GameState> {
        self.leds.animate(LedAnimation::Error);
        self.speaker.play_melody(Melody::GameOver);

        Some(match self.mode {
            GameMode::SinglePlayer => self.finish_single(now_ms),
            GameMode::PassAndPlay => self.end_turn(now_ms),
        })
    }

    fn handle_game_over(
        &mut self,
        now_ms: u32,
    ) -> Option<GameState> {
        if now_ms.wrapping_sub(self.state_entered_ms) < GAME_OVER_DWELL_MS {
            return None;
        }
        if self.buttons.just_pressed().is_some() {
            if self.mode == GameMode::PassAndPlay && !self.roster.is_empty() {
                self.start_match(self.difficulty, now_ms);
            } else {
                self.start_game(self.difficulty, now_ms);
            }
        }
        None
    }

    fn handle_high_score(
        &mut self,
        now_ms: u32,
    ) -> Option<GameState> {
        if now_ms.wrapping_sub(self.state_entered_ms) >= HIGH_SCORE_DWELL_MS {
            Some(GameState::GameOver)
        } else {
            None
        }
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    fn set_state(
        &mut self,
        next: GameState,
        now_ms: u32,
    ) {
        debug!("[GAME] State: {} -> {}", self.state.name(), next.name());
        self.state = next;
        self.state_entered_ms = now_ms;

        self.leds.all_off();
        self.speaker.stop_tone();
        self.feedback = None;
        self.queued_presses.clear();

        match next {
            GameState::ShowingSequence => {
                self.playback.start(now_ms, self.pending_pause_ms);
                self.pending_pause_ms = 0;
            }
            GameState::WaitingInput => {
                self.step = 0;
                self.last_input_ms = now_ms;
                self.publish_game_state();
            }
            GameState::HighScore => {
                info!("[GAME] New high score: {}", self.score);
                self.leds.animate(LedAnimation::Success);
                self.speaker.play_melody(Melody::HighScore);
            }
            GameState::GameOver => {
                info!("[GAME] Game over, score {} (best {})", self.score, self.high_score());
            }
            _ => {}
        }
    }

    /// Reset per-game counters and deal the first step.
    fn new_match(
        &mut self,
        now_ms: u32,
    ) {
        self.score = 0;
        self.step = 0;
        self.match_start_ms = now_ms;
        self.pending_pause_ms = 0;
        self.sequence.clear();
        let max_len = usize::from(self.difficulty.settings().max_length);
        self.sequence.extend(&mut self.rng, max_len, self.mode == GameMode::PassAndPlay);
    }

    /// (Re)start pass-and-play with the current roster.
    fn start_match(
        &mut self,
        difficulty: Difficulty,
        now_ms: u32,
    ) {
        for player in &mut self.roster {
            player.score = 0;
            player.has_played = false;
        }
        self.mode = GameMode::PassAndPlay;
        self.current_player = 0;
        if let Some(first) = self.roster.first() {
            self.current_player_id = first.player_id.clone();
        }

        self.speaker.play_melody(Melody::GameStart);
        self.set_difficulty(difficulty);
        self.new_match(now_ms);

        self.set_state(GameState::ShowingSequence, now_ms);
        self.publish_multiplayer();
    }

    /// End a single-player game: persist it and pick GameOver or the HighScore detour.
    fn finish_single(
        &mut self,
        now_ms: u32,
    ) -> GameState {
        let new_record = self.raise_high_score();
        self.record_session(now_ms);
        self.sink.publish(&GameEvent::GameOver {
            score: self.score,
            high_score: new_record,
        });

        if new_record { GameState::HighScore } else { GameState::GameOver }
    }

    /// End the current pass-and-play turn and hand over to the next player.
    fn end_turn(
        &mut self,
        now_ms: u32,
    ) -> GameState {
        if let Some(player) = self.roster.get_mut(self.current_player) {
            player.score = self.score;
            player.has_played = true;
            self.current_player_id = player.player_id.clone();
            info!("[GAME] Player {} finished with score {}", player.player_name, self.score);
        }
        self.record_session(now_ms);
        self.raise_high_score();

        let next = if self.all_players_finished() {
            info!("[GAME] All players finished");
            GameState::GameOver
        } else {
            self.next_player();
            self.score = 0;
            self.step = 0;
            self.sequence.restart_turn();
            self.pending_pause_ms = TURN_HANDOFF_MS;
            GameState::ShowingSequence
        };

        self.publish_multiplayer();
        next
    }

    /// Move to the next player who has not played yet, wrapping around.
    fn next_player(&mut self) -> bool {
        let count = self.roster.len();
        for offset in 1..=count {
            let index = (self.current_player + offset) % count;
            if !self.roster[index].has_played {
                self.current_player = index;
                self.current_player_id = self.roster[index].player_id.clone();
                info!("[GAME] Next player: {} (index {})", self.roster[index].player_name, index);
                return true;
            }
        }

        warn!("[GAME] All players have already played");
        false
    }

    fn all_players_finished(&self) -> bool { self.roster.iter().all(|p| p.has_played) }

    /// Remember the current score if it beats the tier's best. High scores never go down.
    fn raise_high_score(&mut self) -> bool {
        let best = &mut self.high_scores[self.difficulty.index()];
        if self.score > *best {
            debug!("[GAME] High score {} -> {}", *best, self.score);
            *best = self.score;
            true
        } else {
            false
        }
    }

    fn load_high_scores(&mut self) {
        for difficulty in Difficulty::ALL {
            let best = self.store.high_scores(difficulty, 1);
            self.high_scores[difficulty.index()] = best.first().map_or(0, |s| s.score);
        }
        debug!("[GAME] High scores loaded: {:?}", self.high_scores);
    }

    fn record_session(
        &mut self,
        now_ms: u32,
    ) {
        let player_id = if self.current_player_id.is_empty() {
            truncated(GUEST_ID)
        } else {
            self.current_player_id.clone()
        };
        let session = GameSession {
            player_id,
            player_name: truncated(GUEST_NAME),
            score: self.score,
            difficulty: self.difficulty,
            timestamp: now_ms / 1000,
            duration: now_ms.wrapping_sub(self.match_start_ms) / 1000,
        };

        match self.store.record_game(&session, now_ms) {
            Ok(stored) => info!(
                "[GAME] Session recorded: {} scored {} in {}s",
                stored.player_name, stored.score, stored.duration
            ),
            Err(e) => warn!("[GAME] Session not recorded: {e}"),
        }
    }

    fn publish_game_state(&mut self) {
        let event = GameEvent::GameState {
            state: self.state,
            score: self.score,
            high_score: self.high_score(),
            difficulty: self.difficulty.name(),
            is_active: self.is_active(),
        };
        self.sink.publish(&event);
    }

    fn publish_multiplayer(&mut self) {
        if self.mode != GameMode::PassAndPlay {
            return;
        }
        let Some(current) = self.roster.get(self.current_player) else {
            return;
        };
        let event = GameEvent::Multiplayer {
            game_mode: self.mode,
            current_player_index: self.current_player as u8,
            current_player_id: current.player_id.clone(),
            current_player_name: current.player_name.clone(),
            players: self.roster.clone(),
        };
        self.sink.publish(&event);
    }
}

/// Name shown for a roster entry that is not a registered player.
fn fallback_name(index: usize) -> PlayerName {
    let mut name = PlayerName::new();
    // "Player N" always fits
    let _ = write!(name, "Player {}", index + 1);
    name
}

// =============================================================================
// Unit Tests
// =============================================================================
