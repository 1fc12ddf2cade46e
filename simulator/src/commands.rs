//! Operator commands typed on stdin.
//!
//! One command per line, parsed with clap. A bare pad name (`r`, `green`, ...)
//! is shorthand for `press <pad>`. `help` lists every command.

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use simon_common::colors::Color;
use simon_common::difficulty::Difficulty;

/// One input line.
#[derive(Debug, Parser)]
#[command(name = "simon", no_binary_name = true, disable_version_flag = true)]
#[command(help_template = "Commands:\n{subcommands}")]
struct Line {
    #[command(subcommand)]
    command: Command,
}

/// How long the power button is held.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Hold {
    Short,
    /// Long enough to put the device to sleep
    Long,
}

/// A stored setting addressed by `set`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Subcommand)]
pub enum Setting {
    /// Speaker volume, 0-100
    Volume {
        #[arg(value_parser = clap::value_parser!(u8).range(0..=100))]
        volume: u8,
    },
    /// LED brightness, 0-255
    Brightness { brightness: u8 },
    /// Sound on or off
    Sound {
        #[arg(action = ArgAction::Set, value_parser = on_off)]
        enabled: bool,
    },
    /// Deep sleep after inactivity, on or off
    #[command(name = "sleep")]
    DeepSleep {
        #[arg(action = ArgAction::Set, value_parser = on_off)]
        enabled: bool,
    },
}

#[derive(Clone, Debug, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Press a pad: r g b y (or red green blue yellow)
    Press {
        #[arg(value_parser = color_arg)]
        color: Color,
    },
    /// Press the power button
    #[command(visible_alias = "p")]
    Power {
        #[arg(value_enum, default_value_t = Hold::Short)]
        hold: Hold,
    },
    /// Start a single-player game
    Start {
        #[arg(value_parser = difficulty_arg)]
        difficulty: Option<Difficulty>,
    },
    /// Start pass-and-play with 2-4 player ids
    Multi {
        #[arg(required = true)]
        player_ids: Vec<String>,
        #[arg(short, long, value_parser = difficulty_arg)]
        difficulty: Option<Difficulty>,
    },
    /// Abandon the game
    Stop,
    /// Set the difficulty: 0-3 or easy/medium/hard/expert
    Difficulty {
        #[arg(value_parser = difficulty_arg)]
        difficulty: Difficulty,
    },
    /// Show the game state
    Status,
    /// List registered players
    Players,
    /// Register a player
    #[command(name = "add")]
    AddPlayer {
        #[arg(required = true)]
        name: Vec<String>,
    },
    /// Delete a player
    #[command(name = "del")]
    DeletePlayer { id: String },
    /// Credit games to a player (no id: guest)
    #[command(name = "player")]
    SelectPlayer { id: Option<String> },
    /// High scores, all tiers or one
    Scores {
        #[arg(value_parser = difficulty_arg)]
        difficulty: Option<Difficulty>,
    },
    /// Recent games, all players or one
    History { id: Option<String> },
    /// Show the stored settings
    Settings,
    /// Change a setting
    Set {
        #[command(subcommand)]
        setting: Setting,
    },
    /// Set the wall clock (unix seconds)
    Time { unix: u32 },
    /// Storage usage
    Stats,
    /// Delete every stored document
    Wipe,
    /// Leave the simulator
    #[command(visible_aliases = ["exit", "q"])]
    Quit,
}

/// Difficulty by index or name (case-insensitive).
pub fn parse_difficulty(s: &str) -> Option<Difficulty> {
    if let Ok(index) = s.parse::<usize>() {
        return Difficulty::try_from_index(index);
    }
    Difficulty::ALL.into_iter().find(|d| s.eq_ignore_ascii_case(d.name()))
}

fn difficulty_arg(s: &str) -> Result<Difficulty, String> {
    parse_difficulty(s).ok_or_else(|| format!("unknown difficulty '{s}'"))
}

fn color_arg(s: &str) -> Result<Color, String> { Color::parse(s).ok_or_else(|| format!("unknown pad '{s}'")) }

fn on_off(s: &str) -> Result<bool, String> {
    match s.to_ascii_lowercase().as_str() {
        "on" | "true" | "1" => Ok(true),
        "off" | "false" | "0" => Ok(false),
        _ => Err(format!("expected on or off, got '{s}'")),
    }
}

impl Command {
    /// Parse one input line. `Ok(None)` for a blank line.
    pub fn parse(line: &str) -> Result<Option<Self>, clap::Error> {
        let mut words: Vec<String> = line.split_whitespace().map(str::to_string).collect();
        let Some(first) = words.first_mut() else {
            return Ok(None);
        };
        if Color::parse(first).is_some() {
            words.insert(0, "press".to_string());
        } else {
            first.make_ascii_lowercase();
        }
        Line::try_parse_from(words).map(|line| Some(line.command))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
