//! Game, timing and storage configuration constants.
//!
//! Everything here is a compile-time constant. Pin assignments live in the
//! device crate since they depend on the board.

// =============================================================================
// Game Settings
// =============================================================================

/// Maximum sequence length across all difficulties.
pub const MAX_SEQUENCE_LENGTH: usize = 31;

/// Maximum number of players in a pass-and-play match.
pub const MAX_MATCH_PLAYERS: usize = 4;

/// Minimum number of players in a pass-and-play match.
pub const MIN_MATCH_PLAYERS: usize = 2;

/// Score at which a recorded game counts as a "win" for player stats.
pub const WIN_SCORE_THRESHOLD: u16 = 5;

// =============================================================================
// Game Timing (milliseconds)
// =============================================================================

/// Pause between entering ShowingSequence and the first step lighting up.
pub const SEQUENCE_LEAD_IN_MS: u32 = 500;

/// Pause after a completed round before the next playback starts.
pub const ROUND_PAUSE_MS: u32 = 200;

/// Pause between one player's turn ending and the next player's playback.
pub const TURN_HANDOFF_MS: u32 = 2000;

/// Minimum time spent in GameOver before a press restarts the game.
pub const GAME_OVER_DWELL_MS: u32 = 2000;

/// Time spent celebrating in HighScore before moving to GameOver.
pub const HIGH_SCORE_DWELL_MS: u32 = 2000;

// =============================================================================
// Buttons
// =============================================================================

/// A raw level must differ from the debounced level for this long to commit.
pub const BUTTON_DEBOUNCE_MS: u32 = 50;

/// Hold time for the power button to count as a long press.
pub const BUTTON_LONG_PRESS_MS: u32 = 2000;

/// Presses remembered while a previous press is still being played back.
pub const MAX_QUEUED_PRESSES: usize = 4;

// =============================================================================
// Defaults
// =============================================================================

/// Default speaker volume (0-100).
pub const DEFAULT_VOLUME: u8 = 80;

/// Default LED brightness (0-255).
pub const DEFAULT_LED_BRIGHTNESS: u8 = 200;

/// Sound on by default.
pub const DEFAULT_SOUND_ENABLED: bool = true;

/// Deep sleep on by default.
pub const DEFAULT_DEEP_SLEEP_ENABLED: bool = true;

// =============================================================================
// Power Management
// =============================================================================

/// Inactivity before the device goes to sleep.
pub const DEEP_SLEEP_TIMEOUT_MS: u32 = 120_000;

/// Interval between battery voltage samples.
pub const BATTERY_CHECK_INTERVAL_MS: u32 = 60_000;

/// Below this the battery is reported low (mV).
pub const BATTERY_LOW_VOLTAGE_MV: u16 = 3800;

/// Below this the battery is critical (mV).
pub const BATTERY_CRITICAL_VOLTAGE_MV: u16 = 3600;

/// Voltage considered 100% charge (mV).
pub const BATTERY_FULL_VOLTAGE_MV: u16 = 4200;

/// Voltage considered 0% charge (mV).
pub const BATTERY_EMPTY_VOLTAGE_MV: u16 = 3300;

const _: () = assert!(BATTERY_EMPTY_VOLTAGE_MV < BATTERY_CRITICAL_VOLTAGE_MV);
const _: () = assert!(BATTERY_CRITICAL_VOLTAGE_MV < BATTERY_LOW_VOLTAGE_MV);
const _: () = assert!(BATTERY_LOW_VOLTAGE_MV < BATTERY_FULL_VOLTAGE_MV);

// =============================================================================
// Data Storage
// =============================================================================

/// Maximum number of registered players.
pub const MAX_PLAYERS: usize = 20;

/// Maximum number of game sessions kept in history (oldest evicted).
pub const MAX_GAME_HISTORY: usize = 50;

/// Maximum number of high scores kept per difficulty.
pub const MAX_HIGH_SCORES_PER_DIFFICULTY: usize = 10;

/// Maximum number of high scores kept overall.
pub const MAX_HIGH_SCORES_TOTAL: usize = MAX_HIGH_SCORES_PER_DIFFICULTY * crate::difficulty::NUM_DIFFICULTIES;

/// Player id length (UUID text form).
pub const PLAYER_ID_LEN: usize = 36;

/// Maximum player name length in bytes.
pub const PLAYER_NAME_LEN: usize = 24;

/// Largest JSON document any single store file may hold.
pub const MAX_DOCUMENT_BYTES: usize = 12 * 1024;

const _: () = assert!(MIN_MATCH_PLAYERS <= MAX_MATCH_PLAYERS);
const _: () = assert!(MAX_GAME_HISTORY > 0);
