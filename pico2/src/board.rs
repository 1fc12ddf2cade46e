//! Board configuration for the Simon Says build on a Raspberry Pi Pico 2.
//!
//! # Pin map
//!
//! | Function        | GPIO | Peripheral           |
//! |-----------------|------|----------------------|
//! | LED red         | 2    | PWM slice 1, A       |
//! | LED green       | 3    | PWM slice 1, B       |
//! | LED blue        | 4    | PWM slice 2, A       |
//! | LED yellow      | 5    | PWM slice 2, B       |
//! | Button red      | 10   | input, pull-up       |
//! | Button green    | 11   | input, pull-up       |
//! | Button blue     | 12   | input, pull-up       |
//! | Button yellow   | 13   | input, pull-up       |
//! | Speaker         | 14   | PWM slice 7, A       |
//! | Power button    | 15   | input, pull-up       |
//! | Battery sense   | 26   | ADC0 (1:2 divider)   |
//! | Status LED      | 25   | output (on-board)    |
//!
//! Buttons are active-low. LEDs are driven high through a resistor.

/// System clock (RP2350 default).
pub const SYS_CLOCK_HZ: u32 = 150_000_000;

/// Game loop period.
pub const TICK_MS: u64 = 10;

// =============================================================================
// Flash
// =============================================================================

/// Flash size of a Pico 2.
pub const FLASH_SIZE: usize = 4 * 1024 * 1024;

/// Smallest erasable unit.
pub const FLASH_ERASE_SIZE: usize = 4096;

/// Flash reserved for the game store, at the very end of flash.
pub const STORE_SIZE: usize = 64 * 1024;

/// Offset of the game store from the start of flash.
pub const STORE_OFFSET: u32 = (FLASH_SIZE - STORE_SIZE) as u32;

const _: () = assert!(STORE_SIZE.is_multiple_of(FLASH_ERASE_SIZE));

// =============================================================================
// PWM
// =============================================================================

/// LED PWM counter wrap. Brightness 0-255 maps directly onto the compare value.
pub const LED_PWM_TOP: u16 = 255;

/// Fixed clock divider for the speaker slice; keeps 100 Hz - 5 kHz within a 16-bit counter.
pub const SPEAKER_PWM_DIVIDER: u8 = 64;

// =============================================================================
// Battery
// =============================================================================

/// ADC reference voltage (mV).
pub const ADC_REFERENCE_MV: u32 = 3300;

/// ADC full scale (12-bit).
pub const ADC_RESOLUTION: u32 = 4096;

/// Battery voltage is halved before reaching the ADC pin.
pub const BATTERY_DIVIDER_RATIO: u32 = 2;

/// Readings averaged per battery sample.
pub const BATTERY_SAMPLES: usize = 10;
