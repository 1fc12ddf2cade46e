//! Platform-agnostic core of the Simon Says memory game.
//!
//! Shared between the Pico 2 firmware and the desktop simulator:
//!
//! - [`colors`]: The four pads and their tones
//! - [`config`]: Timing, capacity and default-setting constants
//! - [`difficulty`]: Difficulty tiers and their timing table
//! - [`hal`]: Traits for buttons, LEDs and the speaker
//! - [`button`]: Debounce and edge detection
//! - [`game`]: The game state machine
//! - [`notify`]: JSON game events for remote observers
//! - [`storage`]: Players, history, high scores and settings on a blob store
//! - [`settings`]: Persisted user settings
//! - [`power`]: Inactivity timer and battery thresholds
//! - [`rng`]: Small seeded PRNG for sequence generation
//!
//! # no_std Compatibility
//!
//! This crate is `no_std` and allocation-free; all collections are `heapless`.
//! Time is passed in as a millisecond counter, never read from the platform.

#![cfg_attr(not(test), no_std)]
// Crate-level lints
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_sign_loss)]

pub mod button;
pub mod colors;
pub mod config;
pub mod difficulty;
pub mod game;
pub mod hal;
pub mod notify;
pub mod power;
pub mod rng;
pub mod settings;
pub mod storage;

// Re-export commonly used items
pub use colors::Color;
pub use config::*;
pub use difficulty::{Difficulty, DifficultySettings};
pub use game::{GameMode, GameState, PlayerScore, SimonGame};
pub use notify::{EventSink, GameEvent};
pub use settings::GameSettings;
