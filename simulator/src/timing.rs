//! Timing constants for the simulator.
//!
//! These constants use `std::time::Duration` which is not available in `no_std`
//! environments, so they are defined here rather than in the common crate.

use std::time::Duration;

/// Game loop period, same as the device.
pub const TICK: Duration = Duration::from_millis(10);

/// How long a typed pad press holds the virtual button down.
pub const PRESS_HOLD_MS: u32 = 150;

/// How long `p long` holds the power button down.
pub const LONG_PRESS_HOLD_MS: u32 = 2500;
