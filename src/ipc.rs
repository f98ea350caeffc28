//! Hand-off between the ADC interrupt and the aggregator.
//!
//! One producer (the conversion-complete interrupt) and one consumer (the
//! aggregator task) share a `SampleCell`. The producer writes the value slot
//! first and publishes it with a release store of the state flag; the
//! consumer tests and clears the flag inside a critical section so a
//! conversion landing in between cannot be lost or torn.

use portable_atomic::{AtomicU16, AtomicU32, AtomicU8, Ordering};

use crate::config::ADC_CHANNELS;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(target_os = "none", derive(defmt::Format))]
pub enum Channel {
    X = 0,
    Y = 1,
    Z = 2,
}

impl Channel {
    pub const ALL: [Channel; ADC_CHANNELS] = [Channel::X, Channel::Y, Channel::Z];

    pub const fn index(self) -> usize {
        self as usize
    }
}

impl TryFrom<u8> for Channel {
    type Error = u8;

    fn try_from(raw: u8) -> Result<Self, Self::Error> {
        match raw {
            0 => Ok(Channel::X),
            1 => Ok(Channel::Y),
            2 => Ok(Channel::Z),
            other => Err(other),
        }
    }
}

/// One conversion result, tagged with the channel that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(target_os = "none", derive(defmt::Format))]
pub struct ChannelSample {
    pub channel: Channel,
    pub value: u16,
}

/// What the consumer sees after taking a sample: the channel is carried raw
/// so the aggregator can re-validate it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(target_os = "none", derive(defmt::Format))]
pub struct RawSample {
    pub channel: u8,
    pub value: u16,
}

/// Terminal faults. Both mean the converter's channel selection no longer
/// matches the X/Y/Z sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(target_os = "none", derive(defmt::Format))]
pub enum Fault {
    /// The interrupt read back a channel outside 0..=2.
    SamplerChannel(u8),
    /// The aggregator was handed a channel outside 0..=2.
    AggregatorChannel(u8),
}

impl Fault {
    pub const fn message(&self) -> &'static str {
        "Error: bad ADC channel"
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(target_os = "none", derive(defmt::Format))]
pub enum Taken {
    Empty,
    Sample(RawSample),
    Fault(Fault),
}

const STATE_EMPTY: u8 = 0;
const STATE_READY: u8 = 1;
const STATE_ERROR: u8 = 2;

pub struct SampleCell {
    state: AtomicU8,
    channel: AtomicU8,
    values: [AtomicU16; ADC_CHANNELS],
    overruns: AtomicU32,
}

impl SampleCell {
    pub const fn new() -> Self {
        Self {
            state: AtomicU8::new(STATE_EMPTY),
            channel: AtomicU8::new(0),
            values: [AtomicU16::new(0), AtomicU16::new(0), AtomicU16::new(0)],
            overruns: AtomicU32::new(0),
        }
    }

    /// Producer side: store `sample` and raise the ready flag.
    ///
    /// Returns `false` without touching anything once the cell holds a
    /// fault. A ready sample the consumer never took is overwritten and
    /// counted as an overrun.
    pub fn try_set(&self, sample: ChannelSample) -> bool {
        match self.state.load(Ordering::Acquire) {
            STATE_ERROR => return false,
            STATE_READY => {
                self.overruns.fetch_add(1, Ordering::Relaxed);
            }
            _ => {}
        }
        self.values[sample.channel.index()].store(sample.value, Ordering::Relaxed);
        self.channel.store(sample.channel as u8, Ordering::Relaxed);
        self.state.store(STATE_READY, Ordering::Release);
        true
    }

    /// Producer side: latch a fault. Value slots are left as they were.
    pub fn set_fault(&self, raw_channel: u8) {
        self.channel.store(raw_channel, Ordering::Relaxed);
        self.state.store(STATE_ERROR, Ordering::Release);
    }

    /// Consumer side: take the pending sample, if any, and clear the flag.
    ///
    /// Interrupts are masked only for the flag test, the channel and value
    /// reads and the clear. A latched fault is reported and left in place.
    pub fn try_take_and_clear(&self) -> Taken {
        critical_section::with(|_| match self.state.load(Ordering::Acquire) {
            STATE_READY => {
                let channel = self.channel.load(Ordering::Relaxed);
                let value = self
                    .values
                    .get(channel as usize)
                    .map(|slot| slot.load(Ordering::Relaxed))
                    .unwrap_or(0);
                self.state.store(STATE_EMPTY, Ordering::Relaxed);
                Taken::Sample(RawSample { channel, value })
            }
            STATE_ERROR => Taken::Fault(Fault::SamplerChannel(
                self.channel.load(Ordering::Relaxed),
            )),
            _ => Taken::Empty,
        })
    }

    pub fn is_faulted(&self) -> bool {
        self.state.load(Ordering::Acquire) == STATE_ERROR
    }

    /// Samples overwritten before the consumer took them.
    pub fn overruns(&self) -> u32 {
        self.overruns.load(Ordering::Relaxed)
    }
}

impl Default for SampleCell {
    fn default() -> Self {
        Self::new()
    }
}

/// The cell written by the ADC interrupt and drained by the aggregator task.
pub static SAMPLES: SampleCell = SampleCell::new();

/* latest closed window, aggregator -> report task */
#[cfg(target_os = "none")]
pub static REPORTS: embassy_sync::signal::Signal<
    embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex,
    crate::tasks::aggregator::WindowReport,
> = embassy_sync::signal::Signal::new();

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(channel: Channel, value: u16) -> ChannelSample {
        ChannelSample { channel, value }
    }

    #[test]
    fn empty_cell_yields_nothing() {
        let cell = SampleCell::new();
        assert_eq!(cell.try_take_and_clear(), Taken::Empty);
        assert!(!cell.is_faulted());
    }

    #[test]
    fn take_clears_ready_flag() {
        let cell = SampleCell::new();
        assert!(cell.try_set(sample(Channel::Y, 1234)));
        assert_eq!(
            cell.try_take_and_clear(),
            Taken::Sample(RawSample { channel: 1, value: 1234 })
        );
        assert_eq!(cell.try_take_and_clear(), Taken::Empty);
        assert_eq!(cell.overruns(), 0);
    }

    #[test]
    fn unread_sample_counts_as_overrun() {
        let cell = SampleCell::new();
        cell.try_set(sample(Channel::X, 1));
        cell.try_set(sample(Channel::Y, 2));
        assert_eq!(cell.overruns(), 1);
        assert_eq!(
            cell.try_take_and_clear(),
            Taken::Sample(RawSample { channel: 1, value: 2 })
        );
    }

    #[test]
    fn fault_is_sticky() {
        let cell = SampleCell::new();
        cell.try_set(sample(Channel::X, 500));
        cell.set_fault(3);
        assert!(cell.is_faulted());
        assert!(!cell.try_set(sample(Channel::Y, 600)));
        assert_eq!(cell.try_take_and_clear(), Taken::Fault(Fault::SamplerChannel(3)));
        assert_eq!(cell.try_take_and_clear(), Taken::Fault(Fault::SamplerChannel(3)));
    }

    #[test]
    fn channel_from_raw() {
        assert_eq!(Channel::try_from(0), Ok(Channel::X));
        assert_eq!(Channel::try_from(2), Ok(Channel::Z));
        assert_eq!(Channel::try_from(3), Err(3));
    }
}
