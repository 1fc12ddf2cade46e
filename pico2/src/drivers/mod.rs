//! Board drivers behind the game's hardware ports.
//!
//! - `buttons`: Pad and power buttons on pulled-up GPIO inputs
//! - `leds`: Pad LEDs on two PWM slices
//! - `speaker`: Piezo tone generation on a PWM slice
//! - `flash`: Game store documents in the last 64 KiB of flash
//! - `battery`: Battery voltage through the ADC

mod battery;
mod buttons;
mod flash;
mod leds;
mod speaker;

pub use battery::BatteryMonitor;
pub use buttons::BoardButtons;
pub use flash::FlashBlobs;
pub use leds::PwmLeds;
pub use speaker::PwmSpeaker;
