//! Pad LEDs on PWM.
//!
//! Red and green share slice 1 (channels A and B), blue and yellow share
//! slice 2. The counter wraps at [`LED_PWM_TOP`], so a brightness of 0-255 is
//! the compare value as-is.

use embassy_rp::pwm::{Config, Pwm};
use embassy_time::{Duration, block_for};
use simon_common::colors::Color;
use simon_common::hal::{LedAnimation, LedOutput};
use simon_pico2::board::LED_PWM_TOP;

/// A slice driving two LEDs, with the config last written to it.
struct LedPair {
    pwm: Pwm<'static>,
    config: Config,
}

impl LedPair {
    fn new(pwm: Pwm<'static>) -> Self {
        let mut config = Config::default();
        config.top = LED_PWM_TOP;
        config.compare_a = 0;
        config.compare_b = 0;
        let mut pair = Self { pwm, config };
        pair.apply();
        pair
    }

    fn set(
        &mut self,
        channel_b: bool,
        duty: u16,
    ) {
        if channel_b {
            self.config.compare_b = duty;
        } else {
            self.config.compare_a = duty;
        }
        self.apply();
    }

    fn apply(&mut self) { self.pwm.set_config(&self.config); }
}

pub struct PwmLeds {
    red_green: LedPair,
    blue_yellow: LedPair,
    brightness: u8,
}

impl PwmLeds {
    /// `red_green` and `blue_yellow` are two-channel PWM outputs.
    pub fn new(
        red_green: Pwm<'static>,
        blue_yellow: Pwm<'static>,
        brightness: u8,
    ) -> Self {
        Self {
            red_green: LedPair::new(red_green),
            blue_yellow: LedPair::new(blue_yellow),
            brightness,
        }
    }

    fn write(
        &mut self,
        color: Color,
        duty: u16,
    ) {
        match color {
            Color::Red => self.red_green.set(false, duty),
            Color::Green => self.red_green.set(true, duty),
            Color::Blue => self.blue_yellow.set(false, duty),
            Color::Yellow => self.blue_yellow.set(true, duty),
        }
    }

    fn all_on(&mut self) {
        for color in Color::ALL {
            self.on(color);
        }
    }

    /// Flash every LED `times` times.
    fn blink_all(
        &mut self,
        times: u8,
        on_ms: u64,
        off_ms: u64,
    ) {
        for _ in 0..times {
            self.all_on();
            block_for(Duration::from_millis(on_ms));
            self.all_off();
            block_for(Duration::from_millis(off_ms));
        }
    }
}

impl LedOutput for PwmLeds {
    fn on(
        &mut self,
        color: Color,
    ) {
        self.write(color, u16::from(self.brightness));
    }

    fn off(
        &mut self,
        color: Color,
    ) {
        self.write(color, 0);
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
        match animation {
            LedAnimation::Startup => {
                for color in Color::ALL {
                    self.on(color);
                    block_for(Duration::from_millis(150));
                    self.off(color);
                    block_for(Duration::from_millis(50));
                }
                self.all_on();
                block_for(Duration::from_millis(200));
            }
            LedAnimation::Success => self.blink_all(3, 150, 150),
            LedAnimation::Error => self.blink_all(5, 100, 100),
        }
        self.all_off();
    }
}
