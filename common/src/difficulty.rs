//! Difficulty tiers and their timing presets.
//!
//! The table is a `static` built at compile time and never mutated. Requests
//! for an unknown tier index fall back to [`DEFAULT_DIFFICULTY`].

use serde::{Deserialize, Serialize};

/// Number of difficulty tiers.
pub const NUM_DIFFICULTIES: usize = 4;

/// Tier used when nothing else is configured or an index is out of range.
pub const DEFAULT_DIFFICULTY: Difficulty = Difficulty::Medium;

/// Difficulty tier.
///
/// Serialized as its index (`0..=3`), matching the stored JSON format.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[serde(from = "u8", into = "u8")]
#[repr(u8)]
pub enum Difficulty {
    Easy = 0,
    #[default]
    Medium = 1,
    Hard = 2,
    Expert = 3,
}

/// Timing preset for one tier.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct DifficultySettings {
    /// Display name.
    pub name: &'static str,
    /// Gap between two steps of the played-back sequence (ms).
    pub sequence_speed_ms: u16,
    /// How long each tone (and its LED) stays on (ms).
    pub tone_duration_ms: u16,
    /// Sequence length at which the game is won.
    pub max_length: u8,
    /// Time allowed for each press, measured from the previous one (ms).
    pub timing_window_ms: u16,
}

const TABLE: [DifficultySettings; NUM_DIFFICULTIES] = [
    DifficultySettings {
        name: "Easy",
        sequence_speed_ms: 800,
        tone_duration_ms: 600,
        max_length: 8,
        timing_window_ms: 3000,
    },
    DifficultySettings {
        name: "Medium",
        sequence_speed_ms: 600,
        tone_duration_ms: 400,
        max_length: 14,
        timing_window_ms: 2000,
    },
    DifficultySettings {
        name: "Hard",
        sequence_speed_ms: 400,
        tone_duration_ms: 250,
        max_length: 20,
        timing_window_ms: 1500,
    },
    DifficultySettings {
        name: "Expert",
        sequence_speed_ms: 250,
        tone_duration_ms: 150,
        max_length: 31,
        timing_window_ms: 1000,
    },
];

static DIFFICULTIES: [DifficultySettings; NUM_DIFFICULTIES] = TABLE;

// Every tier must fit in the sequence buffer.
const _: () = {
    let mut i = 0;
    while i < NUM_DIFFICULTIES {
        assert!(TABLE[i].max_length as usize <= crate::config::MAX_SEQUENCE_LENGTH);
        assert!(TABLE[i].max_length > 0);
        i += 1;
    }
};

impl Difficulty {
    /// All tiers, easiest first.
    pub const ALL: [Self; NUM_DIFFICULTIES] = [Self::Easy, Self::Medium, Self::Hard, Self::Expert];

    /// Look up a tier by index, `None` if out of range.
    pub const fn try_from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Self::Easy),
            1 => Some(Self::Medium),
            2 => Some(Self::Hard),
            3 => Some(Self::Expert),
            _ => None,
        }
    }

    /// Look up a tier by index, falling back to the default tier.
    pub const fn from_index(index: usize) -> Self {
        match Self::try_from_index(index) {
            Some(d) => d,
            None => DEFAULT_DIFFICULTY,
        }
    }

    /// Index of this tier (`0..NUM_DIFFICULTIES`).
    #[inline]
    pub const fn index(self) -> usize { self as usize }

    /// Timing preset for this tier.
    #[inline]
    pub fn settings(self) -> &'static DifficultySettings { &DIFFICULTIES[self.index()] }

    /// Display name.
    #[inline]
    pub fn name(self) -> &'static str { self.settings().name }
}

impl From<u8> for Difficulty {
    fn from(value: u8) -> Self { Self::from_index(value as usize) }
}

impl From<Difficulty> for u8 {
    fn from(value: Difficulty) -> Self { value as u8 }
}

/// Timing preset for a raw tier index, falling back to the default tier.
pub fn difficulty_settings(index: usize) -> &'static DifficultySettings { Difficulty::from_index(index).settings() }

// =============================================================================
// Unit Tests
// =============================================================================
