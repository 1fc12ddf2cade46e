//! Button debounce handling with edge and long-press detection.
//!
//! Every tick [`ButtonHandler::update`] samples each button once. A raw level
//! that differs from the debounced level is only committed after the debounce
//! interval has passed since the last quiet sample, so any bounce shorter than
//! [`BUTTON_DEBOUNCE_MS`] is rejected and a noisy signal reads as "no change
//! yet" instead of accumulating.
//!
//! Edge queries ([`ButtonHandler::was_pressed`], [`ButtonHandler::just_pressed`])
//! compare the debounced state with the one captured at the start of the same
//! `update()`, so they are only meaningful right after `update()`.

use crate::colors::{Color, NUM_COLORS};
use crate::config::{BUTTON_DEBOUNCE_MS, BUTTON_LONG_PRESS_MS};
use crate::hal::{Button, ButtonInput};

/// Debounce state for one button.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ButtonState {
    /// Debounced state, `true` = pressed.
    pub current: bool,
    /// Debounced state at the previous `update()`.
    pub previous: bool,
    /// Last undebounced (logical) reading.
    pub raw: bool,
    /// Last time the raw reading agreed with the debounced state (or a change was committed).
    pub last_change_ms: u32,
    /// Time of the last committed press.
    pub last_press_ms: u32,
}

impl ButtonState {
    /// Create a new button state (not pressed).
    pub const fn new() -> Self {
        Self {
            current: false,
            previous: false,
            raw: false,
            last_change_ms: 0,
            last_press_ms: 0,
        }
    }

    /// Feed one logical sample (`true` = pressed) taken at `now_ms`.
    pub fn sample(
        &mut self,
        pressed: bool,
        now_ms: u32,
    ) {
        self.previous = self.current;
        self.raw = pressed;

        if self.raw != self.current {
            // Only commit once the new level outlasted the debounce window
            if now_ms.wrapping_sub(self.last_change_ms) >= BUTTON_DEBOUNCE_MS {
                self.current = self.raw;
                self.last_change_ms = now_ms;

                if self.current && !self.previous {
                    self.last_press_ms = now_ms;
                }
            }
        } else {
            // Quiet signal restarts the debounce timer
            self.last_change_ms = now_ms;
        }
    }

    /// Rising edge during the last sample.
    #[inline]
    pub const fn was_pressed(&self) -> bool { self.current && !self.previous }

    /// Falling edge during the last sample.
    #[inline]
    pub const fn was_released(&self) -> bool { !self.current && self.previous }
}

/// Debounced view of the four pads and the power button.
pub struct ButtonHandler {
    pads: [ButtonState; NUM_COLORS],
    power: ButtonState,
}

impl ButtonHandler {
    /// Create a handler with every button released.
    pub const fn new() -> Self {
        Self {
            pads: [ButtonState::new(); NUM_COLORS],
            power: ButtonState::new(),
        }
    }

    /// Sample every button once.
    ///
    /// Buttons are active-low, so a LOW pin is a logical press.
    pub fn update<I: ButtonInput>(
        &mut self,
        input: &mut I,
        now_ms: u32,
    ) {
        for color in Color::ALL {
            let pressed = !input.is_high(Button::Pad(color));
            self.pads[color.index()].sample(pressed, now_ms);
        }

        let pressed = !input.is_high(Button::Power);
        self.power.sample(pressed, now_ms);
    }

    /// Debounce record for a pad, `None` for an out-of-range index.
    pub fn state(
        &self,
        index: usize,
    ) -> Option<&ButtonState> {
        self.pads.get(index)
    }

    /// Whether the pad is held down.
    #[inline]
    pub fn is_pressed(
        &self,
        color: Color,
    ) -> bool {
        self.pads[color.index()].current
    }

    /// Whether the pad went down during the last `update()`.
    #[inline]
    pub fn was_pressed(
        &self,
        color: Color,
    ) -> bool {
        self.pads[color.index()].was_pressed()
    }

    /// Whether the pad went up during the last `update()`.
    #[inline]
    pub fn was_released(
        &self,
        color: Color,
    ) -> bool {
        self.pads[color.index()].was_released()
    }

    /// First pad currently held, in priority order.
    pub fn pressed(&self) -> Option<Color> { Color::ALL.into_iter().find(|&c| self.is_pressed(c)) }

    /// First pad that went down during the last `update()`.
    ///
    /// Scans Red, Green, Blue, Yellow, so simultaneous presses resolve
    /// deterministically. Does not consume the edge: calling it again before
    /// the next `update()` returns the same answer.
    pub fn just_pressed(&self) -> Option<Color> { Color::ALL.into_iter().find(|&c| self.was_pressed(c)) }

    /// Whether the power button is held down.
    #[inline]
    pub const fn is_power_pressed(&self) -> bool { self.power.current }

    /// Whether the power button went up during the last `update()`.
    #[inline]
    pub const fn was_power_released(&self) -> bool { self.power.was_released() }

    /// How long the power button was (or has been) held since its last press.
    pub fn power_hold_ms(
        &self,
        now_ms: u32,
    ) -> u32 {
        now_ms.wrapping_sub(self.power.last_press_ms)
    }

    /// Whether the power button has been held for at least [`BUTTON_LONG_PRESS_MS`].
    pub fn is_power_long_pressed(
        &self,
        now_ms: u32,
    ) -> bool {
        self.power.current && now_ms.wrapping_sub(self.power.last_press_ms) >= BUTTON_LONG_PRESS_MS
    }

    /// Drop any pending edges.
    pub fn clear_all(&mut self) {
        for pad in &mut self.pads {
            pad.previous = pad.current;
        }
        self.power.previous = self.power.current;
    }

    /// Milliseconds since the pad was last pressed, 0 if it never was.
    pub fn time_since_press(
        &self,
        color: Color,
        now_ms: u32,
    ) -> u32 {
        let state = &self.pads[color.index()];
        if state.last_press_ms == 0 {
            return 0;
        }
        now_ms.wrapping_sub(state.last_press_ms)
    }
}

impl Default for ButtonHandler {
    fn default() -> Self { Self::new() }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    /// Pin levels driven by the test. `true` = held (pin LOW).
    #[derive(Default)]
    struct FakePins {
        held: [bool; 5],
    }

    impl FakePins {
        fn hold(
            &mut self,
            button: Button,
            held: bool,
        ) {
            self.held[slot(button)] = held;
        }
    }

    fn slot(button: Button) -> usize {
        match button {
            Button::Pad(c) => c.index(),
            Button::Power => 4,
        }
    }

    impl ButtonInput for FakePins {
        fn is_high(
            &mut self,
            button: Button,
        ) -> bool {
            !self.held[slot(button)]
        }
    }

    /// Start a handler and let it settle at t = 1000.
    fn settled() -> (ButtonHandler, FakePins) {
        let mut handler = ButtonHandler::new();
        let mut pins = FakePins::default();
        handler.update(&mut pins, 1000);
        (handler, pins)
    }

    #[test]
    fn test_new_state_released() {
        let handler = ButtonHandler::new();
        for c in Color::ALL {
            assert!(!handler.is_pressed(c));
            assert!(!handler.was_pressed(c));
        }
        assert_eq!(handler.just_pressed(), None);
        assert!(!handler.is_power_pressed());
    }

    #[test]
    fn test_press_commits_after_debounce() {
        let (mut handler, mut pins) = settled();
        pins.hold(Button::Pad(Color::Blue), true);

        handler.update(&mut pins, 1010);
        assert!(!handler.is_pressed(Color::Blue));
        handler.update(&mut pins, 1049);
        assert!(!handler.is_pressed(Color::Blue));

        handler.update(&mut pins, 1050);
        assert!(handler.is_pressed(Color::Blue));
        assert!(handler.was_pressed(Color::Blue));
        assert_eq!(handler.just_pressed(), Some(Color::Blue));

        // Edge lasts exactly one update
        handler.update(&mut pins, 1060);
        assert!(handler.is_pressed(Color::Blue));
        assert!(!handler.was_pressed(Color::Blue));
        assert_eq!(handler.just_pressed(), None);
    }

    #[test]
    fn test_fast_toggle_never_commits() {
        let (mut handler, mut pins) = settled();
        let red = Button::Pad(Color::Red);

        // Toggle every 20 ms: each quiet sample resets the timer
        let mut t = 1000;
        for i in 0..50 {
            t += 20;
            pins.hold(red, i % 2 == 0);
            handler.update(&mut pins, t);
            assert!(!handler.is_pressed(Color::Red));
            assert_eq!(handler.just_pressed(), None);
        }
    }

    #[test]
    fn test_stable_signal_commits_exactly_once() {
        let (mut handler, mut pins) = settled();
        pins.hold(Button::Pad(Color::Green), true);

        let mut edges = 0;
        for t in (1010..2000).step_by(10) {
            handler.update(&mut pins, t);
            if handler.was_pressed(Color::Green) {
                edges += 1;
            }
        }
        assert_eq!(edges, 1);
    }

    #[test]
    fn test_release_edge() {
        let (mut handler, mut pins) = settled();
        let yellow = Button::Pad(Color::Yellow);
        pins.hold(yellow, true);
        handler.update(&mut pins, 1100);
        assert!(handler.was_pressed(Color::Yellow));

        pins.hold(yellow, false);
        handler.update(&mut pins, 1200);
        assert!(handler.was_released(Color::Yellow));
        assert!(!handler.is_pressed(Color::Yellow));
        handler.update(&mut pins, 1210);
        assert!(!handler.was_released(Color::Yellow));
    }

    #[test]
    fn test_just_pressed_priority_order() {
        let (mut handler, mut pins) = settled();
        pins.hold(Button::Pad(Color::Yellow), true);
        pins.hold(Button::Pad(Color::Green), true);
        handler.update(&mut pins, 1100);

        assert_eq!(handler.just_pressed(), Some(Color::Green));
        assert_eq!(handler.pressed(), Some(Color::Green));
    }

    #[test]
    fn test_just_pressed_is_idempotent() {
        let (mut handler, mut pins) = settled();
        pins.hold(Button::Pad(Color::Red), true);
        handler.update(&mut pins, 1100);

        assert_eq!(handler.just_pressed(), Some(Color::Red));
        assert_eq!(handler.just_pressed(), Some(Color::Red));

        handler.update(&mut pins, 1110);
        assert_eq!(handler.just_pressed(), None);
        assert_eq!(handler.just_pressed(), None);
    }

    #[test]
    fn test_power_long_press() {
        let (mut handler, mut pins) = settled();
        pins.hold(Button::Power, true);
        handler.update(&mut pins, 1100);
        assert!(handler.is_power_pressed());
        assert!(!handler.is_power_long_pressed(1100));
        assert!(!handler.is_power_long_pressed(3099));
        assert!(handler.is_power_long_pressed(3100));

        pins.hold(Button::Power, false);
        handler.update(&mut pins, 3200);
        assert!(handler.was_power_released());
        assert_eq!(handler.power_hold_ms(3200), 2100);
        assert!(!handler.is_power_long_pressed(5000));
    }

    #[test]
    fn test_power_short_press() {
        let (mut handler, mut pins) = settled();
        pins.hold(Button::Power, true);
        handler.update(&mut pins, 1100);
        pins.hold(Button::Power, false);
        handler.update(&mut pins, 1400);

        assert!(handler.was_power_released());
        assert_eq!(handler.power_hold_ms(1400), 300);
        assert_eq!(handler.just_pressed(), None);
    }

    #[test]
    fn test_clear_all_drops_edges() {
        let (mut handler, mut pins) = settled();
        pins.hold(Button::Pad(Color::Blue), true);
        handler.update(&mut pins, 1100);
        assert_eq!(handler.just_pressed(), Some(Color::Blue));

        handler.clear_all();
        assert_eq!(handler.just_pressed(), None);
        assert!(handler.is_pressed(Color::Blue));
    }

    #[test]
    fn test_time_since_press() {
        let (mut handler, mut pins) = settled();
        assert_eq!(handler.time_since_press(Color::Red, 5000), 0);

        pins.hold(Button::Pad(Color::Red), true);
        handler.update(&mut pins, 1100);
        assert_eq!(handler.time_since_press(Color::Red, 1600), 500);
    }

    #[test]
    fn test_out_of_range_state_is_none() {
        let handler = ButtonHandler::new();
        assert!(handler.state(3).is_some());
        assert!(handler.state(4).is_none());
        assert!(handler.state(usize::MAX).is_none());
    }
}
