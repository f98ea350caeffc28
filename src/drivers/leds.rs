//! Three-LED bar graph driven by the window magnitude.
use embedded_hal::digital::v2::OutputPin;

use crate::config::LedThresholds;

/// Receives one magnitude per completed window.
pub trait Indicator {
    fn set_level(&mut self, magnitude: u32);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(target_os = "none", derive(defmt::Format))]
pub enum Band {
    Off,
    Low,
    Mid,
    High,
}

impl Band {
    pub fn from_magnitude(magnitude: u32, thresholds: &LedThresholds) -> Self {
        let [low, mid, high] = thresholds.bands;
        if magnitude < low {
            Band::Off
        } else if magnitude < mid {
            Band::Low
        } else if magnitude < high {
            Band::Mid
        } else {
            Band::High
        }
    }

    /// Number of lit LEDs.
    pub const fn lit(self) -> usize {
        self as usize
    }
}

pub struct LedBank<P> {
    leds: [P; 3],
    thresholds: LedThresholds,
    band: Band,
}

impl<P: OutputPin> LedBank<P> {
    /// `leds` are ordered bottom of the bar first. All start dark.
    pub fn new(leds: [P; 3], thresholds: LedThresholds) -> Self {
        let mut bank = Self {
            leds,
            thresholds,
            band: Band::Off,
        };
        bank.show(Band::Off);
        bank
    }

    pub fn band(&self) -> Band {
        self.band
    }

    fn show(&mut self, band: Band) {
        for (i, led) in self.leds.iter_mut().enumerate() {
            // Pin errors have nowhere to go.
            let _ = if i < band.lit() {
                led.set_high()
            } else {
                led.set_low()
            };
        }
        self.band = band;
    }
}

impl<P: OutputPin> Indicator for LedBank<P> {
    fn set_level(&mut self, magnitude: u32) {
        let band = Band::from_magnitude(magnitude, &self.thresholds);
        if band != self.band {
            debug!("LED band {:?} -> {:?}", self.band, band);
        }
        self.show(band);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LED_THRESHOLDS;
    use core::cell::Cell;
    use core::convert::Infallible;

    struct FakePin<'a>(&'a Cell<bool>);

    impl OutputPin for FakePin<'_> {
        type Error = Infallible;

        fn set_low(&mut self) -> Result<(), Self::Error> {
            self.0.set(false);
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Self::Error> {
            self.0.set(true);
            Ok(())
        }
    }

    #[test]
    fn band_edges() {
        let t = &LED_THRESHOLDS;
        assert_eq!(Band::from_magnitude(0, t), Band::Off);
        assert_eq!(Band::from_magnitude(10_999, t), Band::Off);
        assert_eq!(Band::from_magnitude(11_000, t), Band::Low);
        assert_eq!(Band::from_magnitude(11_499, t), Band::Low);
        assert_eq!(Band::from_magnitude(11_500, t), Band::Mid);
        assert_eq!(Band::from_magnitude(11_999, t), Band::Mid);
        assert_eq!(Band::from_magnitude(12_000, t), Band::High);
        assert_eq!(Band::from_magnitude(u32::MAX, t), Band::High);
    }

    #[test]
    fn bank_lights_bar_from_bottom() {
        let states = [Cell::new(true), Cell::new(true), Cell::new(true)];
        let pins = [FakePin(&states[0]), FakePin(&states[1]), FakePin(&states[2])];
        let mut bank = LedBank::new(pins, LED_THRESHOLDS);
        let lit = || states.iter().map(Cell::get).collect::<heapless::Vec<bool, 3>>();

        assert_eq!(lit(), [false, false, false]);

        bank.set_level(11_200);
        assert_eq!(bank.band(), Band::Low);
        assert_eq!(lit(), [true, false, false]);

        bank.set_level(11_700);
        assert_eq!(lit(), [true, true, false]);

        bank.set_level(20_000);
        assert_eq!(lit(), [true, true, true]);

        bank.set_level(0);
        assert_eq!(bank.band(), Band::Off);
        assert_eq!(lit(), [false, false, false]);
    }
}
