//! Pad and power buttons.

use embassy_rp::gpio::Input;
use embassy_time::Timer;
use simon_common::colors::NUM_COLORS;
use simon_common::hal::{Button, ButtonInput};

/// Settle time after the power button is released before arming the wake-up.
const RELEASE_SETTLE_MS: u64 = 100;

/// The four pads (in [`simon_common::Color::ALL`] order) and the power button.
///
/// All inputs are active-low with internal pull-ups.
pub struct BoardButtons {
    pads: [Input<'static>; NUM_COLORS],
    power: Input<'static>,
}

impl BoardButtons {
    pub const fn new(
        pads: [Input<'static>; NUM_COLORS],
        power: Input<'static>,
    ) -> Self {
        Self { pads, power }
    }

    /// Wait for the power button to be released, then pressed again.
    pub async fn wait_for_power(&mut self) {
        self.power.wait_for_high().await;
        Timer::after_millis(RELEASE_SETTLE_MS).await;
        self.power.wait_for_low().await;
    }
}

impl ButtonInput for BoardButtons {
    fn is_high(
        &mut self,
        button: Button,
    ) -> bool {
        match button {
            Button::Pad(color) => self.pads[color.index()].is_high(),
            Button::Power => self.power.is_high(),
        }
    }
}
