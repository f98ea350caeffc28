//! Conversion-complete handler.
//!
//! Runs in interrupt context once per finished conversion: file the result
//! under its channel, point the converter at the next axis and acknowledge
//! the event. Bounded work, no waiting.

use crate::config::ADC_CHANNELS;
use crate::drivers::Converter;
use crate::ipc::{Channel, ChannelSample, SampleCell};

/// Next channel in the X, Y, Z rotation.
pub const fn next_channel(current: u8) -> u8 {
    ((current as u32 + 1) % ADC_CHANNELS as u32) as u8
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(target_os = "none", derive(defmt::Format))]
pub enum Outcome {
    Stored(Channel),
    /// A fault is latched; the result was dropped.
    Faulted,
    /// The channel was out of range; a fault has just been latched.
    BadChannel(u8),
}

pub fn on_conversion_complete<C: Converter>(adc: &mut C, cell: &SampleCell) -> Outcome {
    let raw = adc.selected_channel();

    let outcome = match Channel::try_from(raw) {
        Ok(channel) => {
            let sample = ChannelSample {
                channel,
                value: adc.last_result(),
            };
            if cell.try_set(sample) {
                Outcome::Stored(channel)
            } else {
                Outcome::Faulted
            }
        }
        Err(bad) => {
            cell.set_fault(bad);
            Outcome::BadChannel(bad)
        }
    };

    adc.select_channel(next_channel(raw));
    adc.clear_complete();
    outcome
}
