//! Battery sampling task.

use defmt::{info, warn};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::watch::{DynSender, Watch};
use embassy_time::{Duration, Ticker};
use simon_common::config::BATTERY_CHECK_INTERVAL_MS;
use simon_common::power::{BatteryStatus, battery_percentage, battery_status};

use crate::drivers::BatteryMonitor;

/// Latest battery voltage in millivolts.
pub static BATTERY_MV: Watch<CriticalSectionRawMutex, u16, 2> = Watch::new();

/// Sample the battery every [`BATTERY_CHECK_INTERVAL_MS`] and publish the result.
#[embassy_executor::task]
pub async fn battery_task(
    mut monitor: BatteryMonitor,
    sender: DynSender<'static, u16>,
) {
    info!("[POWER] Battery task started");

    let mut ticker = Ticker::every(Duration::from_millis(u64::from(BATTERY_CHECK_INTERVAL_MS)));
    loop {
        match monitor.sample().await {
            Some(mv) => {
                let status = battery_status(mv);
                if status == BatteryStatus::Good {
                    info!("[POWER] Battery {} mV ({}%)", mv, battery_percentage(mv));
                } else {
                    warn!("[POWER] Battery {} mV ({}%): {}", mv, battery_percentage(mv), status);
                }
                sender.send(mv);
            }
            None => warn!("[POWER] Battery read failed"),
        }
        ticker.next().await;
    }
}
