//! The simulated device: game, power handling and operator commands.
//!
//! [`Simulator::tick`] mirrors the firmware main loop. Sleeping stops the
//! game loop until the next power press, which restarts the game as a reboot
//! would.

use anyhow::{Result, bail};
use log::info;
use simon_common::config::{BUTTON_LONG_PRESS_MS, MAX_HIGH_SCORES_PER_DIFFICULTY, MAX_MATCH_PLAYERS, MIN_MATCH_PLAYERS};
use simon_common::hal::{Button, LedAnimation, LedOutput, Melody, ToneOutput};
use simon_common::power::ActivityTimer;
use simon_common::storage::{BlobStorage, GameSession, ScoreStore, Store};
use simon_common::{GameMode, GameSettings, GameState, SimonGame};

use crate::board::{PrintSink, TerminalLeds, TerminalSpeaker, VirtualButtons};
use crate::commands::{Command, Hold, Setting};
use crate::timing::{LONG_PRESS_HOLD_MS, PRESS_HOLD_MS};

pub type Game<B> = SimonGame<VirtualButtons, TerminalLeds, TerminalSpeaker, Store<B>, PrintSink>;

/// Rows shown by `history` and `scores` without a tier.
const LIST_LIMIT: usize = 10;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct Simulator<B: BlobStorage> {
    game: Game<B>,
    settings: GameSettings,
    activity: ActivityTimer,
    asleep: bool,
}

impl<B: BlobStorage> Simulator<B> {
    /// Boot: mount storage, apply the stored settings, play the intro.
    pub fn new(
        blobs: B,
        seed: u32,
        now_ms: u32,
    ) -> Self {
        let mut store = Store::new(blobs, seed.rotate_left(16) ^ 0x5EED_5EED);
        if let Err(e) = store.begin() {
            log::warn!("[STORAGE] {e}, scores will not be kept");
        }
        let settings = store.load_settings();

        let mut game = SimonGame::new(
            VirtualButtons::new(),
            TerminalLeds::new(settings.led_brightness),
            TerminalSpeaker::new(settings.volume),
            store,
            PrintSink,
            seed,
        );
        game.apply_settings(&settings);
        game.leds_mut().animate(LedAnimation::Startup);
        game.speaker_mut().play_melody(Melody::Startup);
        game.begin(now_ms);

        Self {
            game,
            settings,
            activity: ActivityTimer::new(now_ms, settings.deep_sleep_enabled),
            asleep: false,
        }
    }

    pub fn game(&self) -> &Game<B> { &self.game }

    pub fn game_mut(&mut self) -> &mut Game<B> { &mut self.game }

    pub const fn settings(&self) -> &GameSettings { &self.settings }

    pub const fn is_asleep(&self) -> bool { self.asleep }

    /// One pass of the device loop.
    pub fn tick(
        &mut self,
        now_ms: u32,
    ) {
        if self.asleep {
            return;
        }
        self.game.input_mut().set_time(now_ms);
        self.game.tick(now_ms);

        let buttons = self.game.buttons();
        let long_press = buttons.is_power_long_pressed(now_ms);
        let short_press = buttons.was_power_released() && buttons.power_hold_ms(now_ms) < BUTTON_LONG_PRESS_MS;
        if self.game.is_active() || buttons.pressed().is_some() || buttons.is_power_pressed() {
            self.activity.reset(now_ms);
        }

        if self.game.state() == GameState::Idle {
            if long_press {
                self.sleep("power button held");
            } else if short_press {
                self.print_status();
            } else if self.activity.should_sleep(now_ms) {
                self.sleep("idle timeout");
            }
        }
    }

    fn sleep(
        &mut self,
        reason: &str,
    ) {
        info!("[POWER] Entering deep sleep ({reason})");
        self.game.leds_mut().all_off();
        self.game.speaker_mut().stop_tone();
        self.asleep = true;
        println!("Sleeping, press p to wake");
    }

    fn wake(
        &mut self,
        now_ms: u32,
    ) {
        info!("[POWER] Wake-up, restarting");
        self.asleep = false;
        self.activity.reset(now_ms);
        self.game.reset(now_ms);
    }

    /// Run one operator command.
    pub fn execute(
        &mut self,
        command: Command,
        now_ms: u32,
    ) -> Result<Flow> {
        if self.asleep {
            match command {
                Command::Power { .. } => self.wake(now_ms),
                Command::Quit => return Ok(Flow::Quit),
                _ => bail!("sleeping, press p to wake"),
            }
            return Ok(Flow::Continue);
        }
        self.activity.reset(now_ms);

        match command {
            Command::Press { color } => self.game.input_mut().press(Button::Pad(color), now_ms, PRESS_HOLD_MS),
            Command::Power { hold } => {
                let hold_ms = match hold {
                    Hold::Short => PRESS_HOLD_MS,
                    Hold::Long => LONG_PRESS_HOLD_MS,
                };
                self.game.input_mut().press(Button::Power, now_ms, hold_ms);
            }
            Command::Start { difficulty } => {
                let difficulty = difficulty.unwrap_or(self.game.difficulty());
                self.game.start_game(difficulty, now_ms);
            }
            Command::Multi {
                player_ids,
                difficulty,
            } => {
                let ids: Vec<&str> = player_ids.iter().map(String::as_str).collect();
                let difficulty = difficulty.unwrap_or(self.game.difficulty());
                if !self.game.start_multiplayer_game(&ids, difficulty, now_ms) {
                    bail!("a match needs {MIN_MATCH_PLAYERS} to {MAX_MATCH_PLAYERS} players");
                }
            }
            Command::Stop => self.game.reset(now_ms),
            Command::Difficulty { difficulty } => {
                self.game.set_difficulty(difficulty);
                self.settings.difficulty = difficulty;
                self.game.store_mut().save_settings(&self.settings)?;
            }
            Command::Status => self.print_status(),
            Command::Players => {
                let players = self.game.store_mut().all_players();
                if players.is_empty() {
                    println!("No players registered");
                }
                for p in &players {
                    println!(
                        "{}  {:<24} games {:>3}  total {:>5}  best {:>2}  wins {:>3}",
                        p.id, p.name, p.games_played, p.total_score, p.best_score, p.wins
                    );
                }
            }
            Command::AddPlayer { name } => {
                let id = self.game.store_mut().create_player(&name.join(" "), now_ms)?;
                println!("Added {id}");
            }
            Command::DeletePlayer { id } => {
                self.game.store_mut().delete_player(&id)?;
                println!("Deleted {id}");
            }
            Command::SelectPlayer { id } => {
                let id = id.unwrap_or_default();
                if !id.is_empty() && self.game.store_mut().get_player(&id).is_none() {
                    bail!("no player with id {id}");
                }
                self.game.set_current_player(&id);
            }
            Command::Scores {
                difficulty: Some(difficulty),
            } => {
                let scores = self.game.store_mut().high_scores(difficulty, MAX_HIGH_SCORES_PER_DIFFICULTY);
                for (rank, s) in scores.iter().enumerate() {
                    println!("{:>2}. {:<24} {:>3}", rank + 1, s.player_name, s.score);
                }
            }
            Command::Scores { difficulty: None } => {
                for (rank, s) in self.game.store_mut().all_time_high_scores(LIST_LIMIT).iter().enumerate() {
                    println!("{:>2}. {:<24} {:>3}  {}", rank + 1, s.player_name, s.score, s.difficulty.name());
                }
            }
            Command::History { id } => {
                let store = self.game.store_mut();
                let games = match id {
                    Some(id) => store.player_games(&id, LIST_LIMIT),
                    None => store.recent_games(LIST_LIMIT),
                };
                games.iter().for_each(print_session);
            }
            Command::Settings => println!("{}", serde_json::to_string_pretty(&self.settings)?),
            Command::Set { setting } => self.apply_setting(setting)?,
            Command::Time { unix } => self.game.store_mut().set_time_offset(unix, now_ms),
            Command::Stats => {
                let stats = self.game.store_mut().storage_stats()?;
                println!("{}", serde_json::to_string_pretty(&stats)?);
            }
            Command::Wipe => {
                self.game.store_mut().factory_reset()?;
                self.settings = GameSettings::default();
                self.game.store_mut().save_settings(&self.settings)?;
                self.game.apply_settings(&self.settings);
                self.activity.set_enabled(self.settings.deep_sleep_enabled);
                self.game.begin(now_ms);
            }
            Command::Quit => return Ok(Flow::Quit),
        }
        Ok(Flow::Continue)
    }

    fn apply_setting(
        &mut self,
        setting: Setting,
    ) -> Result<()> {
        match setting {
            Setting::Volume { volume } => self.settings.volume = volume,
            Setting::Brightness { brightness } => self.settings.led_brightness = brightness,
            Setting::Sound { enabled } => self.settings.sound_enabled = enabled,
            Setting::DeepSleep { enabled } => self.settings.deep_sleep_enabled = enabled,
        }
        self.settings = self.settings.sanitized();
        self.game.apply_settings(&self.settings);
        self.activity.set_enabled(self.settings.deep_sleep_enabled);
        self.game.store_mut().save_settings(&self.settings)?;
        Ok(())
    }

    fn print_status(&self) {
        let game = &self.game;
        println!(
            "{}  score {}  high score {}  {}",
            game.state().name(),
            game.score(),
            game.high_score(),
            game.difficulty().name()
        );
        if game.game_mode() == GameMode::PassAndPlay {
            for (index, p) in game.players().iter().enumerate() {
                let marker = if index == game.current_player_index() { '>' } else { ' ' };
                let done = if p.has_played { "done" } else { "" };
                println!(" {marker} {:<24} {:>3}  {done}", p.player_name, p.score);
            }
        } else if !game.current_player().is_empty() {
            println!("  player {}", game.current_player());
        }

        let lit: Vec<&str> = game.leds().lit().map(|c| c.name()).collect();
        if !lit.is_empty() {
            println!("  lit {}", lit.join(" "));
        }
        if let Some(hz) = game.speaker().tone_hz() {
            println!("  tone {hz} Hz");
        }
        let speaker = game.speaker();
        println!(
            "  volume {}{}  brightness {}",
            speaker.volume(),
            if speaker.is_muted() { " (muted)" } else { "" },
            game.leds().brightness()
        );
    }
}

fn print_session(s: &GameSession) {
    println!(
        "{:>10}  {:<24} {:>3}  {:<6} {:>4} s",
        s.timestamp,
        s.player_name,
        s.score,
        s.difficulty.name(),
        s.duration
    );
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use simon_common::colors::Color;
    use simon_common::config::DEEP_SLEEP_TIMEOUT_MS;
    use simon_common::difficulty::Difficulty;
    use simon_common::storage::MemoryBlobs;

    use super::*;

    const TICK_MS: u32 = 10;

    fn boot() -> Simulator<MemoryBlobs> { Simulator::new(MemoryBlobs::new(), 7, 0) }

    fn set(
        sim: &mut Simulator<MemoryBlobs>,
        setting: Setting,
    ) {
        sim.execute(Command::Set { setting }, 0).unwrap();
    }

    fn run(
        sim: &mut Simulator<MemoryBlobs>,
        from: u32,
        to: u32,
    ) {
        for now in (from..to).step_by(TICK_MS as usize) {
            sim.tick(now);
        }
    }

    #[test]
    fn test_boot_applies_stored_settings() {
        let mut store = Store::new(MemoryBlobs::new(), 1);
        store.begin().unwrap();
        let stored = GameSettings {
            difficulty: Difficulty::Hard,
            volume: 20,
            sound_enabled: false,
            ..GameSettings::default()
        };
        store.save_settings(&stored).unwrap();
        let blobs = store.blobs();
        let mut copy = MemoryBlobs::new();
        for file in simon_common::storage::StoreFile::ALL {
            if let Some(data) = blobs.contents(file) {
                copy.put(file, data).unwrap();
            }
        }

        let sim = Simulator::new(copy, 3, 0);
        assert_eq!(sim.game().difficulty(), Difficulty::Hard);
        assert_eq!(sim.game().speaker().volume(), 20);
        assert!(sim.game().speaker().is_muted());
        assert_eq!(sim.game().state(), GameState::Idle);
    }

    #[test]
    fn test_pad_press_starts_game() {
        let mut sim = boot();
        sim.execute(Command::Press { color: Color::Red }, 1000).unwrap();
        run(&mut sim, 1000, 1300);
        assert_eq!(sim.game().state(), GameState::ShowingSequence);
        assert!(sim.game().is_active());
    }

    #[test]
    fn test_settings_are_applied_and_saved() {
        let mut sim = boot();
        set(&mut sim, Setting::Volume { volume: 30 });
        set(&mut sim, Setting::Brightness { brightness: 40 });
        sim.execute(Command::Difficulty { difficulty: Difficulty::Expert }, 0).unwrap();

        assert_eq!(sim.game().speaker().volume(), 30);
        assert_eq!(sim.game().leds().brightness(), 40);
        let saved = sim.game_mut().store_mut().load_settings();
        assert_eq!(saved.volume, 30);
        assert_eq!(saved.led_brightness, 40);
        assert_eq!(saved.difficulty, Difficulty::Expert);
    }

    #[test]
    fn test_long_power_press_sleeps_and_wakes() {
        let mut sim = boot();
        sim.execute(Command::Power { hold: Hold::Long }, 1000).unwrap();
        run(&mut sim, 1000, 3200);
        assert!(sim.is_asleep());

        assert!(sim.execute(Command::Status, 5000).is_err());
        sim.execute(Command::Power { hold: Hold::Short }, 5000).unwrap();
        assert!(!sim.is_asleep());
        assert_eq!(sim.game().state(), GameState::Idle);
    }

    #[test]
    fn test_short_power_press_stays_awake() {
        let mut sim = boot();
        sim.execute(Command::Power { hold: Hold::Short }, 1000).unwrap();
        run(&mut sim, 1000, 1500);
        assert!(!sim.is_asleep());
    }

    #[test]
    fn test_idle_timeout() {
        let mut sim = boot();
        run(&mut sim, 0, DEEP_SLEEP_TIMEOUT_MS + 20);
        assert!(sim.is_asleep());

        let mut sim = boot();
        set(&mut sim, Setting::DeepSleep { enabled: false });
        run(&mut sim, 0, DEEP_SLEEP_TIMEOUT_MS + 20);
        assert!(!sim.is_asleep());
    }

    #[test]
    fn test_no_sleep_while_playing() {
        let mut sim = boot();
        sim.execute(Command::Start { difficulty: Some(Difficulty::Easy) }, 0).unwrap();
        // Never answers: the game times out and ends, only then does the timer run
        run(&mut sim, 0, 10_000);
        assert!(!sim.is_asleep());
        assert!(!sim.game().is_active());
    }

    #[test]
    fn test_player_commands() {
        let mut sim = boot();
        assert!(sim.execute(Command::SelectPlayer { id: Some("nobody".into()) }, 0).is_err());
        assert!(sim.execute(Command::AddPlayer { name: vec!["  ".into()] }, 0).is_err());

        sim.execute(Command::AddPlayer { name: vec!["Ada".into()] }, 0).unwrap();
        let id = sim.game_mut().store_mut().all_players()[0].id.clone();
        sim.execute(Command::SelectPlayer { id: Some(id.to_string()) }, 0).unwrap();
        assert_eq!(sim.game().current_player(), id.as_str());

        sim.execute(Command::SelectPlayer { id: None }, 0).unwrap();
        assert_eq!(sim.game().current_player(), "");

        sim.execute(Command::DeletePlayer { id: id.to_string() }, 0).unwrap();
        assert!(sim.execute(Command::DeletePlayer { id: id.to_string() }, 0).is_err());
    }

    #[test]
    fn test_multi_needs_two_players() {
        let mut sim = boot();
        let solo = Command::Multi {
            player_ids: vec!["a".into()],
            difficulty: None,
        };
        assert!(sim.execute(solo, 0).is_err());
        assert_eq!(sim.game().state(), GameState::Idle);

        let pair = Command::Multi {
            player_ids: vec!["a".into(), "b".into()],
            difficulty: Some(Difficulty::Easy),
        };
        sim.execute(pair, 0).unwrap();
        assert_eq!(sim.game().game_mode(), GameMode::PassAndPlay);
        assert_eq!(sim.game().players().len(), 2);
    }

    #[test]
    fn test_wipe() {
        let mut sim = boot();
        sim.execute(Command::AddPlayer { name: vec!["Ada".into()] }, 0).unwrap();
        set(&mut sim, Setting::Volume { volume: 10 });

        sim.execute(Command::Wipe, 0).unwrap();
        assert!(sim.game_mut().store_mut().all_players().is_empty());
        assert_eq!(*sim.settings(), GameSettings::default());
        assert_eq!(sim.game_mut().store_mut().load_settings(), GameSettings::default());
    }

    #[test]
    fn test_quit() {
        let mut sim = boot();
        assert_eq!(sim.execute(Command::Quit, 0).unwrap(), Flow::Quit);
        assert_eq!(sim.execute(Command::Stats, 0).unwrap(), Flow::Continue);
    }
}
