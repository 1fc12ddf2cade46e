//! JSON record store over a [`BlobStorage`] backend.
//!
//! Each document is loaded whole, modified and written back whole. A missing
//! or undecodable document loads as empty (or default settings), so a corrupt
//! file never stops the game. Before [`Store::begin`] succeeds the store is
//! unavailable: reads return defaults and writes fail with
//! [`StorageError::Unavailable`].

use heapless::Vec;
use log::{debug, info, warn};
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::blob::{BlobStorage, StoreFile};
use super::records::{
    GUEST_NAME, GameSession, HighScore, Player, PlayerId, StorageStats, UNKNOWN_NAME, is_guest_id, sanitize_name,
    truncated,
};
use super::{ScoreStore, StorageError};
use crate::config::{
    MAX_DOCUMENT_BYTES, MAX_GAME_HISTORY, MAX_HIGH_SCORES_PER_DIFFICULTY, MAX_HIGH_SCORES_TOTAL, MAX_PLAYERS,
    PLAYER_ID_LEN, WIN_SCORE_THRESHOLD,
};
use crate::difficulty::Difficulty;
use crate::rng::Rng;
use crate::settings::GameSettings;

pub type PlayerList = Vec<Player, MAX_PLAYERS>;
pub type HistoryList = Vec<GameSession, MAX_GAME_HISTORY>;
pub type ScoreList = Vec<HighScore, MAX_HIGH_SCORES_TOTAL>;
pub type TierScores = Vec<HighScore, MAX_HIGH_SCORES_PER_DIFFICULTY>;

const HEX_DIGITS: &[u8; 16] = b"0123456789abcdef";

pub struct Store<B: BlobStorage> {
    blobs: B,
    available: bool,
    /// Unix seconds minus uptime seconds, once a clock sync happened.
    time_offset_s: Option<u32>,
    rng: Rng,
    buf: [u8; MAX_DOCUMENT_BYTES],
}

impl<B: BlobStorage> Store<B> {
    /// Wrap a backend. `seed` feeds player id generation.
    pub fn new(
        blobs: B,
        seed: u32,
    ) -> Self {
        Self {
            blobs,
            available: false,
            time_offset_s: None,
            rng: Rng::new(seed),
            buf: [0; MAX_DOCUMENT_BYTES],
        }
    }

    /// Mount the backend and create the settings file if it is missing.
    ///
    /// On error the store stays usable but keeps nothing.
    pub fn begin(&mut self) -> Result<(), StorageError> {
        if let Err(e) = self.blobs.mount() {
            warn!("[STORAGE] Mount failed: {e}, running without persistence");
            self.available = false;
            return Err(e);
        }
        self.available = true;

        if let Ok(stats) = self.blobs.stats() {
            info!(
                "[STORAGE] Total: {} bytes, used: {} bytes, free: {} bytes",
                stats.total_bytes,
                stats.used_bytes,
                stats.free_bytes()
            );
        }

        match self.blobs.read(StoreFile::Settings, &mut self.buf) {
            Err(StorageError::NotFound) => {
                info!("[STORAGE] Creating default settings file");
                self.save_settings(&GameSettings::default())?;
            }
            Err(e) => warn!("[STORAGE] Settings probe failed: {e}"),
            Ok(_) => {}
        }
        Ok(())
    }

    #[inline]
    pub const fn is_available(&self) -> bool { self.available }

    /// Backend access, for diagnostics.
    pub fn blobs(&self) -> &B { &self.blobs }

    // =========================================================================
    // Clock
    // =========================================================================

    /// Anchor wall-clock time: `unix_s` is "now".
    pub fn set_time_offset(
        &mut self,
        unix_s: u32,
        now_ms: u32,
    ) {
        self.time_offset_s = Some(unix_s.wrapping_sub(now_ms / 1000));
        info!("[STORAGE] Time synced, now {}", self.current_timestamp(now_ms));
    }

    /// Unix seconds once synced, otherwise seconds since boot.
    pub fn current_timestamp(
        &self,
        now_ms: u32,
    ) -> u32 {
        let uptime_s = now_ms / 1000;
        match self.time_offset_s {
            Some(offset) => uptime_s.wrapping_add(offset),
            None => uptime_s,
        }
    }

    // =========================================================================
    // Players
    // =========================================================================

    /// Register a player and return their new id.
    pub fn create_player(
        &mut self,
        name: &str,
        now_ms: u32,
    ) -> Result<PlayerId, StorageError> {
        let name = sanitize_name(name).ok_or(StorageError::InvalidName)?;
        if !self.available {
            return Err(StorageError::Unavailable);
        }

        let mut players = self.all_players();
        if players.is_full() {
            warn!("[STORAGE] Maximum players reached");
            return Err(StorageError::Full);
        }

        let id = self.generate_id();
        let player = Player {
            id: id.clone(),
            name,
            created: self.current_timestamp(now_ms),
            ..Player::default()
        };
        players.push(player).map_err(|_| StorageError::Full)?;
        self.save(StoreFile::Players, &players)?;

        info!("[STORAGE] Player created with id {id}");
        Ok(id)
    }

    pub fn all_players(&mut self) -> PlayerList { self.load(StoreFile::Players) }

    /// Replace a stored player record.
    pub fn update_player(
        &mut self,
        id: &str,
        player: &Player,
    ) -> Result<(), StorageError> {
        let mut players = self.all_players();
        let slot = players
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(StorageError::PlayerNotFound)?;
        *slot = player.clone();
        self.save(StoreFile::Players, &players)
    }

    pub fn delete_player(
        &mut self,
        id: &str,
    ) -> Result<(), StorageError> {
        let mut players = self.all_players();
        let index = players
            .iter()
            .position(|p| p.id == id)
            .ok_or(StorageError::PlayerNotFound)?;
        players.remove(index);
        self.save(StoreFile::Players, &players)
    }

    fn generate_id(&mut self) -> PlayerId {
        let mut id = PlayerId::new();
        for i in 0..PLAYER_ID_LEN {
            let ch = if matches!(i, 8 | 13 | 18 | 23) {
                '-'
            } else {
                HEX_DIGITS[self.rng.range(16) as usize] as char
            };
            // Exactly PLAYER_ID_LEN pushes, cannot overflow
            let _ = id.push(ch);
        }
        id
    }

    // =========================================================================
    // History
    // =========================================================================

    /// Most recent sessions, newest first.
    pub fn recent_games(
        &mut self,
        limit: usize,
    ) -> HistoryList {
        let mut history: HistoryList = self.load(StoreFile::History);
        history.truncate(limit);
        history
    }

    /// Most recent sessions of one player, newest first.
    pub fn player_games(
        &mut self,
        player_id: &str,
        limit: usize,
    ) -> HistoryList {
        let history: HistoryList = self.load(StoreFile::History);
        history
            .into_iter()
            .filter(|s| s.player_id == player_id)
            .take(limit.min(MAX_GAME_HISTORY))
            .collect()
    }

    fn update_player_stats(
        &mut self,
        session: &GameSession,
    ) -> Result<(), StorageError> {
        let Some(mut player) = self.get_player(&session.player_id) else {
            return Ok(());
        };
        player.games_played = player.games_played.saturating_add(1);
        player.total_score = player.total_score.saturating_add(u32::from(session.score));
        player.best_score = player.best_score.max(session.score);
        if session.score >= WIN_SCORE_THRESHOLD {
            player.wins = player.wins.saturating_add(1);
        }
        self.update_player(&session.player_id, &player)?;
        debug!(
            "[STORAGE] Player {} stats: games={}, best={}",
            player.name, player.games_played, player.best_score
        );
        Ok(())
    }

    // =========================================================================
    // High Scores
    // =========================================================================

    /// Best scores across all tiers, highest first.
    pub fn all_time_high_scores(
        &mut self,
        limit: usize,
    ) -> ScoreList {
        let mut scores = self.load_scores();
        scores.truncate(limit);
        scores
    }

    /// Insert a session into the high score table.
    ///
    /// Each tier keeps its best [`MAX_HIGH_SCORES_PER_DIFFICULTY`] entries.
    /// Returns `false` if the score did not make the table.
    pub fn add_high_score(
        &mut self,
        session: &GameSession,
    ) -> Result<bool, StorageError> {
        let mut scores = self.load_scores();
        let entry = HighScore::from(session);

        let tier_count = scores.iter().filter(|s| s.difficulty == entry.difficulty).count();
        if tier_count >= MAX_HIGH_SCORES_PER_DIFFICULTY {
            // List is sorted, so the tier's last entry is its lowest
            match scores.iter().rposition(|s| s.difficulty == entry.difficulty) {
                Some(lowest) if scores[lowest].score < entry.score => {
                    scores.remove(lowest);
                }
                _ => return Ok(false),
            }
        }

        let at = scores
            .iter()
            .position(|s| s.score < entry.score)
            .unwrap_or(scores.len());
        scores.insert(at, entry).map_err(|_| StorageError::Full)?;
        self.save(StoreFile::Scores, &scores)?;
        Ok(true)
    }

    fn load_scores(&mut self) -> ScoreList {
        let mut scores: ScoreList = self.load(StoreFile::Scores);
        scores.sort_unstable_by(|a, b| b.score.cmp(&a.score));
        scores
    }

    // =========================================================================
    // Settings and Maintenance
    // =========================================================================

    /// Stored settings, clamped to valid ranges; defaults if absent or corrupt.
    pub fn load_settings(&mut self) -> GameSettings {
        let settings: GameSettings = self.load(StoreFile::Settings);
        settings.sanitized()
    }

    pub fn save_settings(
        &mut self,
        settings: &GameSettings,
    ) -> Result<(), StorageError> {
        self.save(StoreFile::Settings, &settings.sanitized())?;
        debug!("[STORAGE] Settings saved");
        Ok(())
    }

    /// Delete every document.
    pub fn factory_reset(&mut self) -> Result<(), StorageError> {
        if !self.available {
            return Err(StorageError::Unavailable);
        }
        info!("[STORAGE] Factory reset");
        for file in StoreFile::ALL {
            self.blobs.remove(file)?;
        }
        Ok(())
    }

    pub fn storage_stats(&mut self) -> Result<StorageStats, StorageError> {
        if !self.available {
            return Err(StorageError::Unavailable);
        }
        self.blobs.stats()
    }

    // =========================================================================
    // Document I/O
    // =========================================================================

    fn load<T: DeserializeOwned + Default>(
        &mut self,
        file: StoreFile,
    ) -> T {
        if !self.available {
            return T::default();
        }

        let len = match self.blobs.read(file, &mut self.buf) {
            Ok(len) => len,
            Err(StorageError::NotFound) => return T::default(),
            Err(e) => {
                warn!("[STORAGE] Failed to read {}: {e}", file.name());
                return T::default();
            }
        };

        match serde_json_core::from_slice::<T>(&self.buf[..len]) {
            Ok((value, _)) => value,
            Err(_) => {
                warn!("[STORAGE] Failed to parse {}, using defaults", file.name());
                T::default()
            }
        }
    }

    fn save<T: Serialize>(
        &mut self,
        file: StoreFile,
        value: &T,
    ) -> Result<(), StorageError> {
        if !self.available {
            return Err(StorageError::Unavailable);
        }
        let len = serde_json_core::to_slice(value, &mut self.buf).map_err(|_| StorageError::Encode)?;
        self.blobs.write(file, &self.buf[..len])
    }
}

impl<B: BlobStorage> ScoreStore for Store<B> {
    fn get_player(
        &mut self,
        id: &str,
    ) -> Option<Player> {
        self.all_players().into_iter().find(|p| p.id == id)
    }

    fn record_game(
        &mut self,
        session: &GameSession,
        now_ms: u32,
    ) -> Result<GameSession, StorageError> {
        if !self.available {
            return Err(StorageError::Unavailable);
        }

        let mut stamped = session.clone();
        stamped.player_name = if is_guest_id(&session.player_id) {
            truncated(GUEST_NAME)
        } else {
            match self.get_player(&session.player_id) {
                Some(player) => player.name,
                None => {
                    warn!("[STORAGE] Player id {} not found", session.player_id);
                    truncated(UNKNOWN_NAME)
                }
            }
        };
        stamped.timestamp = self.current_timestamp(now_ms);

        info!(
            "[STORAGE] Recording game: player={} ({}), score={}, time={}",
            stamped.player_name, stamped.player_id, stamped.score, stamped.timestamp
        );

        let mut history: HistoryList = self.load(StoreFile::History);
        history.truncate(MAX_GAME_HISTORY - 1);
        history.insert(0, stamped.clone()).map_err(|_| StorageError::Full)?;
        self.save(StoreFile::History, &history)?;

        if !is_guest_id(&stamped.player_id) {
            if let Err(e) = self.update_player_stats(&stamped) {
                warn!("[STORAGE] Player stats not updated: {e}");
            }
        }
        if let Err(e) = self.add_high_score(&stamped) {
            warn!("[STORAGE] High score not saved: {e}");
        }

        Ok(stamped)
    }

    fn high_scores(
        &mut self,
        difficulty: Difficulty,
        limit: usize,
    ) -> TierScores {
        self.load_scores()
            .into_iter()
            .filter(|s| s.difficulty == difficulty)
            .take(limit.min(MAX_HIGH_SCORES_PER_DIFFICULTY))
            .collect()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryBlobs;

    fn store() -> Store<MemoryBlobs> {
        let mut store = Store::new(MemoryBlobs::new(), 7);
        store.begin().unwrap();
        store
    }

    fn session(
        player_id: &str,
        score: u16,
        difficulty: Difficulty,
    ) -> GameSession {
        GameSession {
            player_id: truncated(player_id),
            score,
            difficulty,
            ..GameSession::default()
        }
    }

    #[test]
    fn test_begin_writes_default_settings() {
        let store = store();
        assert!(store.blobs().contents(StoreFile::Settings).is_some());
        assert!(store.blobs().contents(StoreFile::Players).is_none());
    }

    #[test]
    fn test_begin_keeps_existing_settings() {
        let mut blobs = MemoryBlobs::new();
        blobs.put(StoreFile::Settings, br#"{"volume":10}"#).unwrap();
        let mut store = Store::new(blobs, 1);
        store.begin().unwrap();
        assert_eq!(store.load_settings().volume, 10);
    }

    #[test]
    fn test_unavailable_backend_degrades() {
        let mut store = Store::new(MemoryBlobs::unmountable(), 1);
        assert_eq!(store.begin(), Err(StorageError::Unavailable));
        assert!(!store.is_available());

        assert_eq!(store.load_settings(), GameSettings::default());
        assert!(store.all_players().is_empty());
        assert_eq!(store.create_player("Ada", 0), Err(StorageError::Unavailable));
        assert_eq!(
            store.record_game(&session("guest", 3, Difficulty::Easy), 0),
            Err(StorageError::Unavailable)
        );
        assert!(store.high_scores(Difficulty::Easy, 10).is_empty());
        assert_eq!(store.factory_reset(), Err(StorageError::Unavailable));
    }

    #[test]
    fn test_create_and_get_player() {
        let mut store = store();
        let id = store.create_player("  Ada ", 5_000).unwrap();

        assert_eq!(id.len(), 36);
        for (i, ch) in id.chars().enumerate() {
            if matches!(i, 8 | 13 | 18 | 23) {
                assert_eq!(ch, '-');
            } else {
                assert!(ch.is_ascii_hexdigit() && !ch.is_ascii_uppercase());
            }
        }

        let player = store.get_player(&id).unwrap();
        assert_eq!(player.name.as_str(), "Ada");
        assert_eq!(player.games_played, 0);
        assert_eq!(player.created, 5);
    }

    #[test]
    fn test_player_limit() {
        let mut store = store();
        for _ in 0..MAX_PLAYERS {
            store.create_player("P", 0).unwrap();
        }
        assert_eq!(store.create_player("One too many", 0), Err(StorageError::Full));
        assert_eq!(store.create_player("\"\"", 0), Err(StorageError::InvalidName));
    }

    #[test]
    fn test_update_and_delete_player() {
        let mut store = store();
        let id = store.create_player("Ada", 0).unwrap();

        let mut player = store.get_player(&id).unwrap();
        player.name = truncated("Grace");
        store.update_player(&id, &player).unwrap();
        assert_eq!(store.get_player(&id).unwrap().name.as_str(), "Grace");

        store.delete_player(&id).unwrap();
        assert!(store.get_player(&id).is_none());
        assert_eq!(store.delete_player(&id), Err(StorageError::PlayerNotFound));
        assert_eq!(store.update_player(&id, &player), Err(StorageError::PlayerNotFound));
    }

    #[test]
    fn test_record_game_fills_names_and_stats() {
        let mut store = store();
        let id = store.create_player("Ada", 0).unwrap();

        let guest = store.record_game(&session("", 2, Difficulty::Easy), 1_000).unwrap();
        assert_eq!(guest.player_name.as_str(), "Guest");

        let unknown = store.record_game(&session("nobody", 2, Difficulty::Easy), 1_000).unwrap();
        assert_eq!(unknown.player_name.as_str(), "Unknown");

        store.record_game(&session(&id, 3, Difficulty::Easy), 2_000).unwrap();
        let recorded = store.record_game(&session(&id, 6, Difficulty::Easy), 3_000).unwrap();
        assert_eq!(recorded.player_name.as_str(), "Ada");
        assert_eq!(recorded.timestamp, 3);

        let player = store.get_player(&id).unwrap();
        assert_eq!(player.games_played, 2);
        assert_eq!(player.total_score, 9);
        assert_eq!(player.best_score, 6);
        assert_eq!(player.wins, 1);

        assert_eq!(store.player_games(&id, 10).len(), 2);
        assert_eq!(store.player_games(&id, 1)[0].score, 6);
    }

    #[test]
    fn test_history_newest_first_and_bounded() {
        let mut store = store();
        for score in 0..(MAX_GAME_HISTORY as u16 + 5) {
            store.record_game(&session("guest", score, Difficulty::Medium), 0).unwrap();
        }

        let history = store.recent_games(usize::MAX);
        assert_eq!(history.len(), MAX_GAME_HISTORY);
        assert_eq!(history[0].score, MAX_GAME_HISTORY as u16 + 4);
        assert_eq!(history[MAX_GAME_HISTORY - 1].score, 5);
        assert_eq!(store.recent_games(3).len(), 3);
    }

    #[test]
    fn test_high_scores_sorted_and_bounded_per_tier() {
        let mut store = store();
        for score in [3, 9, 1, 7, 12, 4, 8, 2, 11, 5, 6, 10, 0] {
            store.record_game(&session("guest", score, Difficulty::Hard), 0).unwrap();
        }
        store.record_game(&session("guest", 1, Difficulty::Easy), 0).unwrap();

        let hard = store.high_scores(Difficulty::Hard, 50);
        assert_eq!(hard.len(), MAX_HIGH_SCORES_PER_DIFFICULTY);
        assert_eq!(hard[0].score, 12);
        assert!(hard.windows(2).all(|w| w[0].score >= w[1].score));
        assert_eq!(hard[MAX_HIGH_SCORES_PER_DIFFICULTY - 1].score, 3);

        assert_eq!(store.high_scores(Difficulty::Hard, 2).len(), 2);
        assert_eq!(store.high_scores(Difficulty::Easy, 10).len(), 1);
        assert!(store.high_scores(Difficulty::Expert, 10).is_empty());

        let all = store.all_time_high_scores(100);
        assert_eq!(all.len(), MAX_HIGH_SCORES_PER_DIFFICULTY + 1);
        assert_eq!(all[0].score, 12);
    }

    #[test]
    fn test_low_score_does_not_enter_full_tier() {
        let mut store = store();
        for _ in 0..MAX_HIGH_SCORES_PER_DIFFICULTY {
            store.record_game(&session("guest", 5, Difficulty::Easy), 0).unwrap();
        }
        let added = store.add_high_score(&session("guest", 5, Difficulty::Easy)).unwrap();
        assert!(!added);
        let added = store.add_high_score(&session("guest", 6, Difficulty::Easy)).unwrap();
        assert!(added);
        assert_eq!(store.high_scores(Difficulty::Easy, 1)[0].score, 6);
    }

    #[test]
    fn test_corrupt_documents_load_as_defaults() {
        let mut store = store();
        store.blobs.put(StoreFile::Settings, b"{not json").unwrap();
        store.blobs.put(StoreFile::Players, b"[{\"id\":").unwrap();
        store.blobs.put(StoreFile::History, b"\xff\xfe").unwrap();

        assert_eq!(store.load_settings(), GameSettings::default());
        assert!(store.all_players().is_empty());
        assert!(store.recent_games(10).is_empty());
    }

    #[test]
    fn test_settings_round_trip_is_sanitized() {
        let mut store = store();
        let settings = GameSettings {
            difficulty: Difficulty::Expert,
            volume: 180,
            led_brightness: 10,
            sound_enabled: false,
            deep_sleep_enabled: false,
        };
        store.save_settings(&settings).unwrap();

        let loaded = store.load_settings();
        assert_eq!(loaded.difficulty, Difficulty::Expert);
        assert_eq!(loaded.volume, 100);
        assert_eq!(loaded.led_brightness, 10);
        assert!(!loaded.sound_enabled);
    }

    #[test]
    fn test_write_failure_surfaces() {
        let mut store = store();
        store.blobs.set_fail_writes(true);
        assert_eq!(
            store.record_game(&session("guest", 1, Difficulty::Easy), 0),
            Err(StorageError::Io)
        );
        assert!(store.recent_games(10).is_empty());
    }

    #[test]
    fn test_time_offset() {
        let mut store = store();
        assert_eq!(store.current_timestamp(42_500), 42);

        store.set_time_offset(1_700_000_000, 10_000);
        assert_eq!(store.current_timestamp(10_000), 1_700_000_000);
        assert_eq!(store.current_timestamp(70_000), 1_700_000_060);
    }

    #[test]
    fn test_factory_reset() {
        let mut store = store();
        store.create_player("Ada", 0).unwrap();
        store.record_game(&session("guest", 4, Difficulty::Easy), 0).unwrap();

        store.factory_reset().unwrap();
        assert!(store.all_players().is_empty());
        assert!(store.recent_games(10).is_empty());
        assert!(store.all_time_high_scores(10).is_empty());
        assert_eq!(store.storage_stats().unwrap().used_bytes, 0);
    }
}
