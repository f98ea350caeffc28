// Centralize all configuration constants

/// Complete X-Y-Z triples summed before one magnitude update.
pub const WINDOW: u32 = 24;

pub const ADC_CHANNELS: usize = 3;
/// Conversion trigger rate (TIM3 TRGO). Each axis is sampled at a third of this.
pub const ADC_TRIGGER_HZ: u32 = 3_906;
pub const UART_BAUDRATE: u32 = 38_400;

/// Per-axis rest readings of the accelerometer, in raw converter counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Calibration {
    pub zero: [u16; ADC_CHANNELS],
}

impl Calibration {
    /// Baseline for an un-averaged window sum on `axis`.
    pub const fn offset(&self, axis: usize) -> u32 {
        self.zero[axis] as u32 * WINDOW
    }
}

// Mid-scale of the 12-bit converter on all three axes
pub const CALIBRATION: Calibration = Calibration {
    zero: [2048, 2048, 2048],
};

/// Break points between the LED bands, in magnitude units (counts x WINDOW).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedThresholds {
    pub bands: [u32; 3],
}

pub const LED_THRESHOLDS: LedThresholds = LedThresholds {
    bands: [11_000, 11_500, 12_000],
};

const _: () = assert!(WINDOW > 0);
const _: () = assert!(
    LED_THRESHOLDS.bands[0] < LED_THRESHOLDS.bands[1]
        && LED_THRESHOLDS.bands[1] < LED_THRESHOLDS.bands[2]
);
// The widest window sum must fit the accumulators.
const _: () = assert!((u16::MAX as u64) * (WINDOW as u64) <= u32::MAX as u64);
