//! Inactivity tracking and battery level classification.

use crate::config::{
    BATTERY_CRITICAL_VOLTAGE_MV, BATTERY_EMPTY_VOLTAGE_MV, BATTERY_FULL_VOLTAGE_MV, BATTERY_LOW_VOLTAGE_MV,
    DEEP_SLEEP_TIMEOUT_MS,
};

// =============================================================================
// Activity Timer
// =============================================================================

/// Tracks the last user activity to decide when the device may sleep.
#[derive(Clone, Copy, Debug)]
pub struct ActivityTimer {
    last_activity_ms: u32,
    enabled: bool,
}

impl ActivityTimer {
    pub const fn new(
        now_ms: u32,
        enabled: bool,
    ) -> Self {
        Self {
            last_activity_ms: now_ms,
            enabled,
        }
    }

    /// Record user activity.
    pub fn reset(
        &mut self,
        now_ms: u32,
    ) {
        self.last_activity_ms = now_ms;
    }

    pub fn set_enabled(
        &mut self,
        enabled: bool,
    ) {
        self.enabled = enabled;
    }

    #[inline]
    pub const fn is_enabled(&self) -> bool { self.enabled }

    /// Milliseconds since the last recorded activity.
    pub fn idle_ms(
        &self,
        now_ms: u32,
    ) -> u32 {
        now_ms.wrapping_sub(self.last_activity_ms)
    }

    /// Whether the inactivity timeout has elapsed and sleeping is allowed.
    pub fn should_sleep(
        &self,
        now_ms: u32,
    ) -> bool {
        self.enabled && self.idle_ms(now_ms) >= DEEP_SLEEP_TIMEOUT_MS
    }
}

// =============================================================================
// Battery
// =============================================================================

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BatteryStatus {
    Good,
    Low,
    Critical,
}

/// Classify a battery voltage.
pub const fn battery_status(millivolts: u16) -> BatteryStatus {
    if millivolts < BATTERY_CRITICAL_VOLTAGE_MV {
        BatteryStatus::Critical
    } else if millivolts < BATTERY_LOW_VOLTAGE_MV {
        BatteryStatus::Low
    } else {
        BatteryStatus::Good
    }
}

/// Linear charge estimate between the empty and full voltages, 0-100.
pub const fn battery_percentage(millivolts: u16) -> u8 {
    if millivolts <= BATTERY_EMPTY_VOLTAGE_MV {
        return 0;
    }
    if millivolts >= BATTERY_FULL_VOLTAGE_MV {
        return 100;
    }
    let span = (BATTERY_FULL_VOLTAGE_MV - BATTERY_EMPTY_VOLTAGE_MV) as u32;
    let above = (millivolts - BATTERY_EMPTY_VOLTAGE_MV) as u32;
    (above * 100 / span) as u8
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sleep_after_timeout() {
        let mut timer = ActivityTimer::new(1000, true);
        assert!(!timer.should_sleep(1000 + DEEP_SLEEP_TIMEOUT_MS - 1));
        assert!(timer.should_sleep(1000 + DEEP_SLEEP_TIMEOUT_MS));

        timer.reset(100_000);
        assert!(!timer.should_sleep(1000 + DEEP_SLEEP_TIMEOUT_MS));
    }

    #[test]
    fn test_disabled_never_sleeps() {
        let timer = ActivityTimer::new(0, false);
        assert!(!timer.should_sleep(u32::MAX / 2));
    }

    #[test]
    fn test_battery_status_thresholds() {
        assert_eq!(battery_status(4100), BatteryStatus::Good);
        assert_eq!(battery_status(3800), BatteryStatus::Good);
        assert_eq!(battery_status(3799), BatteryStatus::Low);
        assert_eq!(battery_status(3600), BatteryStatus::Low);
        assert_eq!(battery_status(3599), BatteryStatus::Critical);
    }

    #[test]
    fn test_battery_percentage() {
        assert_eq!(battery_percentage(3000), 0);
        assert_eq!(battery_percentage(3300), 0);
        assert_eq!(battery_percentage(3750), 50);
        assert_eq!(battery_percentage(4200), 100);
        assert_eq!(battery_percentage(4500), 100);
    }
}
