use core::fmt::Write;

use crate::config::{Calibration, ADC_CHANNELS, WINDOW};
use crate::drivers::Indicator;
use crate::ipc::{Channel, Fault, SampleCell, Taken};
use crate::isqrt::isqrt;

/// Consumer end of the interrupt hand-off.
pub trait SampleSource {
    fn try_take_and_clear(&self) -> Taken;
}

impl SampleSource for SampleCell {
    fn try_take_and_clear(&self) -> Taken {
        SampleCell::try_take_and_clear(self)
    }
}

/// Per-axis running sums over one window.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct AxisAccumulator {
    sums: [u32; ADC_CHANNELS],
    cycle: u32,
}

impl AxisAccumulator {
    pub const fn new() -> Self {
        Self {
            sums: [0; ADC_CHANNELS],
            cycle: 0,
        }
    }

    /// Add one reading. Returns `true` when a Z reading completes the
    /// `WINDOW`-th triple.
    pub fn add(&mut self, channel: Channel, value: u16) -> bool {
        let sum = &mut self.sums[channel.index()];
        *sum = sum.saturating_add(value as u32);
        if channel != Channel::Z {
            return false;
        }
        self.cycle = (self.cycle + 1) % WINDOW;
        self.cycle == 0
    }

    pub fn sums(&self) -> [u32; ADC_CHANNELS] {
        self.sums
    }

    /// Completed triples since the last window.
    pub fn cycle(&self) -> u32 {
        self.cycle
    }

    /// Window sums minus the per-axis rest baseline.
    pub fn centered(&self, calibration: &Calibration) -> [i32; ADC_CHANNELS] {
        let mut deviation = [0; ADC_CHANNELS];
        for (axis, d) in deviation.iter_mut().enumerate() {
            *d = self.sums[axis] as i32 - calibration.offset(axis) as i32;
        }
        deviation
    }

    pub fn reset(&mut self) {
        self.sums = [0; ADC_CHANNELS];
    }
}

/// Integer Euclidean norm. Squares and their sum saturate at `u32::MAX`,
/// which caps the result at 65535.
pub fn magnitude(deviation: &[i32; ADC_CHANNELS]) -> u32 {
    let energy = deviation.iter().fold(0u32, |acc, d| {
        let a = d.unsigned_abs();
        acc.saturating_add(a.saturating_mul(a))
    });
    isqrt(energy)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(target_os = "none", derive(defmt::Format))]
pub struct WindowReport {
    /// 1-based count of completed windows.
    pub window: u32,
    pub sums: [u32; ADC_CHANNELS],
    pub deviation: [i32; ADC_CHANNELS],
    pub magnitude: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(target_os = "none", derive(defmt::Format))]
pub enum Poll {
    /// Nothing was pending.
    Idle,
    /// A sample was added; the window is still open.
    Consumed,
    /// A window closed and the indicator was updated.
    Window(WindowReport),
    /// Fatal fault. The diagnostic has been written; stop polling.
    Halted(Fault),
}

pub struct Aggregator {
    acc: AxisAccumulator,
    calibration: Calibration,
    windows: u32,
    halted: Option<Fault>,
}

impl Aggregator {
    pub const fn new(calibration: Calibration) -> Self {
        Self {
            acc: AxisAccumulator::new(),
            calibration,
            windows: 0,
            halted: None,
        }
    }

    pub fn accumulator(&self) -> &AxisAccumulator {
        &self.acc
    }

    /// One pass of the main loop.
    ///
    /// The indicator is updated with interrupts masked; it shares the port
    /// with code the conversion interrupt can preempt.
    pub fn poll<S, I, D>(&mut self, source: &S, indicator: &mut I, diag: &mut D) -> Poll
    where
        S: SampleSource,
        I: Indicator,
        D: Write,
    {
        if let Some(fault) = self.halted {
            return Poll::Halted(fault);
        }

        let sample = match source.try_take_and_clear() {
            Taken::Empty => return Poll::Idle,
            Taken::Fault(fault) => return self.halt(fault, diag),
            Taken::Sample(sample) => sample,
        };
        let channel = match Channel::try_from(sample.channel) {
            Ok(channel) => channel,
            Err(bad) => return self.halt(Fault::AggregatorChannel(bad), diag),
        };

        if !self.acc.add(channel, sample.value) {
            return Poll::Consumed;
        }

        let deviation = self.acc.centered(&self.calibration);
        let magnitude = magnitude(&deviation);
        critical_section::with(|_| indicator.set_level(magnitude));

        self.windows = self.windows.wrapping_add(1);
        let report = WindowReport {
            window: self.windows,
            sums: self.acc.sums(),
            deviation,
            magnitude,
        };
        self.acc.reset();
        debug!("window {} magnitude {}", report.window, magnitude);
        Poll::Window(report)
    }

    fn halt<D: Write>(&mut self, fault: Fault, diag: &mut D) -> Poll {
        error!("sampling fault: {:?}", fault);
        let _ = write!(diag, "\n{}\n", fault.message());
        self.halted = Some(fault);
        Poll::Halted(fault)
    }
}

#[cfg(target_os = "none")]
pub use task::aggregator_task;

#[cfg(target_os = "none")]
mod task {
    use embassy_executor::task;
    use embassy_futures::yield_now;
    use embassy_stm32::gpio::Output;
    use embassy_stm32::mode::Blocking;
    use embassy_stm32::usart::UartTx;

    use super::{Aggregator, Poll};
    use crate::config::CALIBRATION;
    use crate::drivers::adc::TriggeredAdc;
    use crate::drivers::{Console, LedBank};
    use crate::ipc::{REPORTS, SAMPLES};

    /// Main sampling loop. Never returns; on a fault it stops the converter
    /// and parks.
    #[task]
    pub async fn aggregator_task(
        mut adc: TriggeredAdc,
        mut leds: LedBank<Output<'static>>,
        mut console: Console<UartTx<'static, Blocking>>,
    ) {
        info!("aggregator started, window of {} triples", crate::config::WINDOW);
        let mut aggregator = Aggregator::new(CALIBRATION);
        adc.start();

        let fault = loop {
            match aggregator.poll(&SAMPLES, &mut leds, &mut console) {
                Poll::Idle => yield_now().await,
                Poll::Consumed => {}
                Poll::Window(report) => REPORTS.signal(report),
                Poll::Halted(fault) => break fault,
            }
        };

        // The interrupt would otherwise keep converting into a dead cell.
        adc.halt();
        error!("sampling stopped: {:?}, {} overruns", fault, SAMPLES.overruns());
        core::future::pending::<()>().await;
    }
}
