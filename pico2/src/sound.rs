//! Speaker tone generation and melody tables.
//!
//! The speaker is a piezo on a PWM slice with a fixed clock divider. A tone's
//! frequency sets the counter wrap (`top`); the volume sets the compare value,
//! up to a 50% duty cycle at full volume.

use simon_common::colors::{TONE_FREQ_BLUE, TONE_FREQ_GREEN, TONE_FREQ_RED, TONE_FREQ_SUCCESS, TONE_FREQ_YELLOW};
use simon_common::hal::Melody;

/// One melody step. A frequency of 0 is a rest.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Note {
    pub freq_hz: u16,
    pub duration_ms: u16,
}

const fn note(
    freq_hz: u16,
    duration_ms: u16,
) -> Note {
    Note { freq_hz, duration_ms }
}

const fn rest(duration_ms: u16) -> Note { note(0, duration_ms) }

/// Fifth above yellow, for the fanfare.
const FANFARE_HIGH: u16 = TONE_FREQ_YELLOW * 3 / 2;

// =============================================================================
// Melodies
// =============================================================================

/// The four pad tones, ascending.
pub const STARTUP: &[Note] = &[
    note(TONE_FREQ_RED, 150),
    note(TONE_FREQ_GREEN, 150),
    note(TONE_FREQ_BLUE, 150),
    note(TONE_FREQ_YELLOW, 200),
];

/// C5 E5 G5 C6, C6 G5.
pub const GAME_START: &[Note] = &[
    note(523, 100),
    note(659, 100),
    note(784, 100),
    note(1047, 150),
    rest(50),
    note(1047, 100),
    note(784, 200),
];

/// Descending "sad trombone".
pub const GAME_OVER: &[Note] = &[
    note(415, 250),
    rest(50),
    note(370, 250),
    rest(50),
    note(330, 250),
    rest(50),
    note(294, 250),
    rest(50),
    note(247, 600),
    rest(100),
    note(220, 150),
    rest(50),
    note(196, 150),
    rest(50),
    note(175, 400),
];

pub const HIGH_SCORE: &[Note] = &[
    note(TONE_FREQ_YELLOW, 100),
    note(FANFARE_HIGH, 100),
    rest(50),
    note(TONE_FREQ_YELLOW, 100),
    note(FANFARE_HIGH, 100),
    rest(50),
    note(TONE_FREQ_YELLOW, 100),
    note(FANFARE_HIGH, 100),
    rest(50),
    note(TONE_FREQ_SUCCESS, 400),
];

pub const fn melody_notes(melody: Melody) -> &'static [Note] {
    match melody {
        Melody::Startup => STARTUP,
        Melody::GameStart => GAME_START,
        Melody::GameOver => GAME_OVER,
        Melody::HighScore => HIGH_SCORE,
    }
}

// =============================================================================
// PWM Math
// =============================================================================

/// Counter wrap for `freq_hz` at the given clock and divider.
///
/// `None` for a rest or a frequency the 16-bit counter cannot reach.
pub fn tone_top(
    sys_clock_hz: u32,
    divider: u8,
    freq_hz: u16,
) -> Option<u16> {
    if freq_hz == 0 || divider == 0 {
        return None;
    }
    let counts = sys_clock_hz / (u32::from(divider) * u32::from(freq_hz));
    if !(2..=65_536).contains(&counts) {
        return None;
    }
    Some((counts - 1) as u16)
}

/// Compare value for `volume` (0-100): 50% duty at full volume.
pub fn tone_compare(
    top: u16,
    volume: u8,
) -> u16 {
    let half = (u32::from(top) + 1) / 2;
    (half * u32::from(volume.min(100)) / 100) as u16
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{SPEAKER_PWM_DIVIDER, SYS_CLOCK_HZ};

    #[test]
    fn test_tone_top() {
        assert_eq!(tone_top(SYS_CLOCK_HZ, SPEAKER_PWM_DIVIDER, 218), Some(10_750));
        assert_eq!(tone_top(SYS_CLOCK_HZ, SPEAKER_PWM_DIVIDER, 1000), Some(2342));
        assert_eq!(tone_top(SYS_CLOCK_HZ, SPEAKER_PWM_DIVIDER, 0), None);
        // Too low for a 16-bit counter at this divider
        assert_eq!(tone_top(SYS_CLOCK_HZ, SPEAKER_PWM_DIVIDER, 20), None);
    }

    #[test]
    fn test_every_note_is_playable() {
        let melodies = [Melody::Startup, Melody::GameStart, Melody::GameOver, Melody::HighScore];
        for melody in melodies {
            let notes = melody_notes(melody);
            assert!(!notes.is_empty());
            assert_ne!(notes.last().map(|n| n.freq_hz), Some(0));
            for n in notes.iter().filter(|n| n.freq_hz != 0) {
                assert!(tone_top(SYS_CLOCK_HZ, SPEAKER_PWM_DIVIDER, n.freq_hz).is_some());
            }
            let total: u32 = notes.iter().map(|n| u32::from(n.duration_ms)).sum();
            assert!(total < 3000, "{melody:?} too long");
        }
    }

    #[test]
    fn test_tone_compare() {
        assert_eq!(tone_compare(10_750, 100), 5375);
        assert_eq!(tone_compare(10_750, 50), 2687);
        assert_eq!(tone_compare(10_750, 0), 0);
        assert_eq!(tone_compare(10_750, 250), 5375);
    }
}
