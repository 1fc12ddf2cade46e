//! Hardware ports consumed by the game.
//!
//! The game never touches pins directly. The device crate implements these
//! traits on top of embassy GPIO/PWM drivers, the simulator implements them
//! on a terminal, and the tests implement them with recording mocks.

use crate::colors::Color;

/// A physical button.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Button {
    /// One of the four colored pads.
    Pad(Color),
    /// The power button.
    Power,
}

impl Button {
    /// All buttons in scan order: the four pads, then power.
    pub const ALL: [Self; 5] = [
        Self::Pad(Color::Red),
        Self::Pad(Color::Green),
        Self::Pad(Color::Blue),
        Self::Pad(Color::Yellow),
        Self::Power,
    ];
}

/// Raw button levels.
///
/// Buttons are wired active-low with pull-ups: a pressed button reads LOW.
pub trait ButtonInput {
    /// Electrical level of the button's pin, `true` for HIGH.
    fn is_high(
        &mut self,
        button: Button,
    ) -> bool;
}

/// Canned LED animations. Choreography is left to the implementation.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LedAnimation {
    Startup,
    Success,
    Error,
}

/// The four pad LEDs.
pub trait LedOutput {
    /// Light one pad at the global brightness.
    fn on(
        &mut self,
        color: Color,
    );

    /// Switch one pad off.
    fn off(
        &mut self,
        color: Color,
    );

    /// Switch every pad off.
    fn all_off(&mut self) {
        for color in Color::ALL {
            self.off(color);
        }
    }

    /// Set the global brightness (0-255).
    fn set_brightness(
        &mut self,
        brightness: u8,
    );

    /// Run an animation. May block until it is done; always ends with all LEDs off.
    fn animate(
        &mut self,
        animation: LedAnimation,
    );
}

/// Short melodies. Choreography is left to the implementation.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Melody {
    Startup,
    GameStart,
    GameOver,
    HighScore,
}

/// The piezo speaker.
pub trait ToneOutput {
    /// Start a continuous tone; it keeps sounding until [`ToneOutput::stop_tone`].
    fn start_tone(
        &mut self,
        frequency_hz: u16,
    );

    /// Silence the speaker.
    fn stop_tone(&mut self);

    /// Play a melody. May block until it is done.
    fn play_melody(
        &mut self,
        melody: Melody,
    );

    /// Set the volume (0-100).
    fn set_volume(
        &mut self,
        volume: u8,
    );

    /// Mute or unmute all output.
    fn set_muted(
        &mut self,
        muted: bool,
    );
}
