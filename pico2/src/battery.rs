//! Battery voltage from raw ADC readings.

use crate::board::{ADC_REFERENCE_MV, ADC_RESOLUTION, BATTERY_DIVIDER_RATIO};

/// Convert one 12-bit ADC reading into battery millivolts.
pub const fn adc_to_millivolts(raw: u16) -> u16 {
    let mv = raw as u32 * ADC_REFERENCE_MV * BATTERY_DIVIDER_RATIO / ADC_RESOLUTION;
    if mv > u16::MAX as u32 { u16::MAX } else { mv as u16 }
}

/// Average a batch of readings and convert. `None` if no reading succeeded.
pub fn average_millivolts(readings: &[u16]) -> Option<u16> {
    if readings.is_empty() {
        return None;
    }
    let sum: u32 = readings.iter().map(|&r| u32::from(r)).sum();
    Some(adc_to_millivolts((sum / readings.len() as u32) as u16))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_adc_to_millivolts() {
        assert_eq!(adc_to_millivolts(0), 0);
        // Half scale on the pin is the full reference after the divider
        assert_eq!(adc_to_millivolts(2048), 3300);
        assert_eq!(adc_to_millivolts(4095), 6598);
    }

    #[test]
    fn test_average() {
        assert_eq!(average_millivolts(&[]), None);
        assert_eq!(average_millivolts(&[2048, 2048, 2048]), Some(3300));
        assert_eq!(average_millivolts(&[2000, 2096]), Some(3300));
    }
}
