//! Battery voltage sensing on ADC0.

use embassy_rp::adc::{Adc, Blocking, Channel};
use embassy_time::Timer;
use heapless::Vec;
use simon_pico2::battery::average_millivolts;
use simon_pico2::board::BATTERY_SAMPLES;

/// Delay between the readings of one sample.
const READING_INTERVAL_MS: u64 = 2;

pub struct BatteryMonitor {
    adc: Adc<'static, Blocking>,
    channel: Channel<'static>,
}

impl BatteryMonitor {
    pub const fn new(
        adc: Adc<'static, Blocking>,
        channel: Channel<'static>,
    ) -> Self {
        Self { adc, channel }
    }

    /// Average of [`BATTERY_SAMPLES`] readings in millivolts, `None` if every read failed.
    pub async fn sample(&mut self) -> Option<u16> {
        let mut readings: Vec<u16, BATTERY_SAMPLES> = Vec::new();
        for _ in 0..BATTERY_SAMPLES {
            if let Ok(raw) = self.adc.blocking_read(&mut self.channel) {
                let _ = readings.push(raw);
            }
            Timer::after_millis(READING_INTERVAL_MS).await;
        }
        average_millivolts(&readings)
    }
}
