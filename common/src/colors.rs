//! Game colors and their tones.
//!
//! Each of the four pads pairs an LED, a button and a tone. The enum order is
//! also the button priority order used when two pads are pressed in the same
//! tick (see [`crate::button::ButtonHandler::just_pressed`]).
//!
//! | Color  | Index | Tone   |
//! |--------|-------|--------|
//! | Red    | 0     | 218 Hz |
//! | Green  | 1     | 163 Hz |
//! | Blue   | 2     | 330 Hz |
//! | Yellow | 3     | 276 Hz |

use serde::{Serialize, Serializer};

// =============================================================================
// Tone Frequencies
// =============================================================================

/// Red pad tone (Hz).
pub const TONE_FREQ_RED: u16 = 218;

/// Green pad tone (Hz).
pub const TONE_FREQ_GREEN: u16 = 163;

/// Blue pad tone (Hz).
pub const TONE_FREQ_BLUE: u16 = 330;

/// Yellow pad tone (Hz).
pub const TONE_FREQ_YELLOW: u16 = 276;

/// Low buzz played on a wrong press.
pub const TONE_FREQ_ERROR: u16 = 100;

/// C6, used for the high score fanfare.
pub const TONE_FREQ_SUCCESS: u16 = 1047;

/// Number of colored pads.
pub const NUM_COLORS: usize = 4;

// =============================================================================
// Color
// =============================================================================

/// One of the four colored pads.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Color {
    Red = 0,
    Green = 1,
    Blue = 2,
    Yellow = 3,
}

impl Color {
    /// All colors in priority order.
    pub const ALL: [Self; NUM_COLORS] = [Self::Red, Self::Green, Self::Blue, Self::Yellow];

    /// Convert a raw index into a color.
    ///
    /// Out-of-range indices are not an error, they simply map to `None`.
    #[inline]
    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Self::Red),
            1 => Some(Self::Green),
            2 => Some(Self::Blue),
            3 => Some(Self::Yellow),
            _ => None,
        }
    }

    /// Position of this color in [`Color::ALL`].
    #[inline]
    pub const fn index(self) -> usize { self as usize }

    /// Human-readable name, as shown in the web UI.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Red => "Red",
            Self::Green => "Green",
            Self::Blue => "Blue",
            Self::Yellow => "Yellow",
        }
    }

    /// Tone frequency in Hz for this pad.
    pub const fn tone_hz(self) -> u16 {
        match self {
            Self::Red => TONE_FREQ_RED,
            Self::Green => TONE_FREQ_GREEN,
            Self::Blue => TONE_FREQ_BLUE,
            Self::Yellow => TONE_FREQ_YELLOW,
        }
    }

    /// Parse a color from its name or initial (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|c| s.eq_ignore_ascii_case(c.name()) || s.eq_ignore_ascii_case(&c.name()[..1]))
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(
        &self,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

/// Name for an optional color, `"None"` when absent.
pub const fn color_name(color: Option<Color>) -> &'static str {
    match color {
        Some(c) => c.name(),
        None => "None",
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_round_trip() {
        for (i, color) in Color::ALL.iter().enumerate() {
            assert_eq!(color.index(), i);
            assert_eq!(Color::from_index(i), Some(*color));
        }
    }

    #[test]
    fn test_out_of_range_index_is_none() {
        assert_eq!(Color::from_index(4), None);
        assert_eq!(Color::from_index(255), None);
        assert_eq!(color_name(Color::from_index(9)), "None");
    }

    #[test]
    fn test_tones_are_distinct() {
        for a in Color::ALL {
            for b in Color::ALL {
                if a != b {
                    assert_ne!(a.tone_hz(), b.tone_hz());
                }
            }
        }
    }

    #[test]
    fn test_parse() {
        assert_eq!(Color::parse("red"), Some(Color::Red));
        assert_eq!(Color::parse("Y"), Some(Color::Yellow));
        assert_eq!(Color::parse("b"), Some(Color::Blue));
        assert_eq!(Color::parse("purple"), None);
        assert_eq!(Color::parse(""), None);
    }
}
