//! A terminal stand-in for the Simon board.
//!
//! Buttons are "held" until a deadline so a typed key goes through the same
//! debounce as a real press. LEDs, tones and events are printed on stdout.

use simon_common::colors::{Color, NUM_COLORS};
use simon_common::hal::{Button, ButtonInput, LedAnimation, LedOutput, Melody, ToneOutput};
use simon_common::notify::{EventSink, GameEvent, MAX_EVENT_JSON};
use simon_common::settings::MAX_VOLUME;

// =============================================================================
// Buttons
// =============================================================================

const POWER_SLOT: usize = NUM_COLORS;

/// Buttons pressed from the keyboard.
#[derive(Debug, Default)]
pub struct VirtualButtons {
    /// Release deadline per button; pads first, then power.
    held_until: [Option<u32>; NUM_COLORS + 1],
    now_ms: u32,
}

impl VirtualButtons {
    pub fn new() -> Self { Self::default() }

    const fn slot(button: Button) -> usize {
        match button {
            Button::Pad(color) => color.index(),
            Button::Power => POWER_SLOT,
        }
    }

    /// Clock used to answer `is_high`; set before every game tick.
    pub fn set_time(
        &mut self,
        now_ms: u32,
    ) {
        self.now_ms = now_ms;
    }

    /// Hold `button` down from `now_ms` for `hold_ms`.
    pub fn press(
        &mut self,
        button: Button,
        now_ms: u32,
        hold_ms: u32,
    ) {
        self.held_until[Self::slot(button)] = Some(now_ms.saturating_add(hold_ms));
    }

    pub fn is_held(
        &self,
        button: Button,
    ) -> bool {
        self.held_until[Self::slot(button)].is_some_and(|until| self.now_ms < until)
    }
}

impl ButtonInput for VirtualButtons {
    fn is_high(
        &mut self,
        button: Button,
    ) -> bool {
        // Active-low, like the real pins
        !self.is_held(button)
    }
}

// =============================================================================
// LEDs
// =============================================================================

/// Prints every LED change.
#[derive(Debug)]
pub struct TerminalLeds {
    lit: [bool; NUM_COLORS],
    brightness: u8,
}

impl TerminalLeds {
    pub const fn new(brightness: u8) -> Self {
        Self {
            lit: [false; NUM_COLORS],
            brightness,
        }
    }

    pub fn lit(&self) -> impl Iterator<Item = Color> + '_ { Color::ALL.into_iter().filter(|c| self.lit[c.index()]) }

    pub const fn brightness(&self) -> u8 { self.brightness }
}

impl LedOutput for TerminalLeds {
    fn on(
        &mut self,
        color: Color,
    ) {
        if !self.lit[color.index()] {
            println!("  [LED] {:<6} on", color.name());
        }
        self.lit[color.index()] = true;
    }

    fn off(
        &mut self,
        color: Color,
    ) {
        self.lit[color.index()] = false;
    }

    fn set_brightness(
        &mut self,
        brightness: u8,
    ) {
        self.brightness = brightness;
    }

    fn animate(
        &mut self,
        animation: LedAnimation,
    ) {
        println!("  [LED] {animation:?} animation");
        self.all_off();
    }
}

// =============================================================================
// Speaker
// =============================================================================

/// Prints tones and melodies instead of playing them.
#[derive(Debug)]
pub struct TerminalSpeaker {
    volume: u8,
    muted: bool,
    tone_hz: Option<u16>,
}

impl TerminalSpeaker {
    pub fn new(volume: u8) -> Self {
        Self {
            volume: volume.min(MAX_VOLUME),
            muted: false,
            tone_hz: None,
        }
    }

    /// Frequency currently sounding.
    pub const fn tone_hz(&self) -> Option<u16> { self.tone_hz }

    pub const fn volume(&self) -> u8 { self.volume }

    pub const fn is_muted(&self) -> bool { self.muted }

    const fn silent(&self) -> bool { self.muted || self.volume == 0 }
}

impl ToneOutput for TerminalSpeaker {
    fn start_tone(
        &mut self,
        frequency_hz: u16,
    ) {
        if self.silent() {
            return;
        }
        self.tone_hz = Some(frequency_hz);
        println!("  [TONE] {frequency_hz} Hz");
    }

    fn stop_tone(&mut self) { self.tone_hz = None; }

    fn play_melody(
        &mut self,
        melody: Melody,
    ) {
        if !self.silent() {
            println!("  [TONE] {melody:?} melody");
        }
    }

    fn set_volume(
        &mut self,
        volume: u8,
    ) {
        self.volume = volume.min(MAX_VOLUME);
    }

    fn set_muted(
        &mut self,
        muted: bool,
    ) {
        self.muted = muted;
        if muted {
            self.stop_tone();
        }
    }
}

// =============================================================================
// Events
// =============================================================================

/// Prints each event as one JSON line.
#[derive(Debug, Default)]
pub struct PrintSink;

impl EventSink for PrintSink {
    fn publish(
        &mut self,
        event: &GameEvent,
    ) {
        let mut buf = [0u8; MAX_EVENT_JSON];
        match event.to_json(&mut buf) {
            Ok(json) => println!("EVENT {json}"),
            Err(_) => log::warn!("[EVENTS] Could not encode {}", event.kind()),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_press_holds_until_deadline() {
        let mut buttons = VirtualButtons::new();
        let red = Button::Pad(Color::Red);
        assert!(buttons.is_high(red));

        buttons.press(red, 100, 150);
        buttons.set_time(100);
        assert!(!buttons.is_high(red));
        assert!(buttons.is_high(Button::Pad(Color::Blue)));

        buttons.set_time(249);
        assert!(!buttons.is_high(red));
        buttons.set_time(250);
        assert!(buttons.is_high(red));
    }

    #[test]
    fn test_power_slot_is_separate() {
        let mut buttons = VirtualButtons::new();
        buttons.press(Button::Power, 0, 100);
        assert!(!buttons.is_high(Button::Power));
        for color in Color::ALL {
            assert!(buttons.is_high(Button::Pad(color)));
        }
    }

    #[test]
    fn test_muted_speaker_is_silent() {
        let mut speaker = TerminalSpeaker::new(80);
        speaker.start_tone(218);
        assert_eq!(speaker.tone_hz(), Some(218));

        speaker.set_muted(true);
        assert_eq!(speaker.tone_hz(), None);
        speaker.start_tone(330);
        assert_eq!(speaker.tone_hz(), None);

        speaker.set_muted(false);
        speaker.set_volume(0);
        speaker.start_tone(330);
        assert_eq!(speaker.tone_hz(), None);
    }

    #[test]
    fn test_leds_track_lit_pads() {
        let mut leds = TerminalLeds::new(200);
        leds.on(Color::Green);
        leds.on(Color::Yellow);
        assert_eq!(leds.lit().collect::<Vec<_>>(), [Color::Green, Color::Yellow]);

        leds.animate(LedAnimation::Error);
        assert_eq!(leds.lit().count(), 0);
    }
}
