//! Runtime settings persisted as `settings.json`.

use serde::{Deserialize, Serialize};

use crate::config::{DEFAULT_DEEP_SLEEP_ENABLED, DEFAULT_LED_BRIGHTNESS, DEFAULT_SOUND_ENABLED, DEFAULT_VOLUME};
use crate::difficulty::{DEFAULT_DIFFICULTY, Difficulty};

/// Highest accepted volume.
pub const MAX_VOLUME: u8 = 100;

/// User-adjustable settings, loaded at boot.
///
/// Fields missing from a stored document take their default value, and an
/// unknown difficulty index decodes as the default tier.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[serde(default, rename_all = "camelCase")]
pub struct GameSettings {
    pub difficulty: Difficulty,
    /// Speaker volume, 0-100.
    pub volume: u8,
    /// LED brightness, 0-255.
    pub led_brightness: u8,
    pub sound_enabled: bool,
    pub deep_sleep_enabled: bool,
}

impl GameSettings {
    pub const DEFAULT: Self = Self {
        difficulty: DEFAULT_DIFFICULTY,
        volume: DEFAULT_VOLUME,
        led_brightness: DEFAULT_LED_BRIGHTNESS,
        sound_enabled: DEFAULT_SOUND_ENABLED,
        deep_sleep_enabled: DEFAULT_DEEP_SLEEP_ENABLED,
    };

    /// Copy with every field forced into its valid range.
    pub fn sanitized(self) -> Self {
        Self {
            volume: self.volume.min(MAX_VOLUME),
            ..self
        }
    }

    /// Effective speaker volume: 0 when sound is off.
    pub fn effective_volume(&self) -> u8 {
        if self.sound_enabled { self.volume.min(MAX_VOLUME) } else { 0 }
    }
}

impl Default for GameSettings {
    fn default() -> Self { Self::DEFAULT }
}

// =============================================================================
// Unit Tests
// =============================================================================
