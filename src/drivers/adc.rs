//! Timer-triggered, three-channel analog converter.

/// What the sampler needs from the converter, called from interrupt context.
pub trait Converter {
    /// Channel the finished conversion was taken from, as the hardware
    /// side reports it. Anything outside 0..=2 is a fault.
    fn selected_channel(&self) -> u8;
    /// Channel for the next triggered conversion.
    fn select_channel(&mut self, channel: u8);
    fn last_result(&self) -> u16;
    /// Acknowledge the conversion-complete event.
    fn clear_complete(&mut self);
}

/// Reported by `selected_channel` when the hardware sequence and the
/// software cursor disagree.
pub const CHANNEL_DESYNC: u8 = u8::MAX;

#[cfg(target_os = "none")]
pub use hw::{ConversionRegs, TriggeredAdc};

#[cfg(target_os = "none")]
mod hw {
    use embassy_stm32::adc::{Adc, SampleTime};
    use embassy_stm32::interrupt::{self, InterruptExt};
    use embassy_stm32::pac;
    use embassy_stm32::peripherals::{ADC1, TIM3};
    use embassy_stm32::time::Hertz;
    use embassy_stm32::timer::low_level::Timer;
    use portable_atomic::{AtomicU8, Ordering};

    use super::{Converter, CHANNEL_DESYNC};
    use crate::config::{ADC_CHANNELS, ADC_TRIGGER_HZ};

    // CFGR1.EXTSEL value for TIM3_TRGO on STM32G0
    const EXTSEL_TIM3_TRGO: u8 = 3;
    // Channels 0..=2 (PA0, PA1, PA2)
    const SEQUENCE_MASK: u32 = (1 << ADC_CHANNELS) - 1;

    /// Software cursor into the hardware sequence. Only the ADC interrupt
    /// writes it after `start`.
    static CURSOR: AtomicU8 = AtomicU8::new(0);

    /// Owns the converter and its trigger timer for the life of the firmware.
    pub struct TriggeredAdc {
        _adc: Adc<'static, ADC1>,
        timer: Timer<'static, TIM3>,
    }

    impl TriggeredAdc {
        pub fn new(mut adc: Adc<'static, ADC1>, timer: Timer<'static, TIM3>) -> Self {
            // Also powers up and calibrates the converter.
            adc.set_sample_time(SampleTime::CYCLES39_5);
            Self { _adc: adc, timer }
        }

        /// Arm the sequence X, Y, Z with one channel per trigger and start
        /// the trigger timer.
        pub fn start(&mut self) {
            let regs = pac::ADC1;

            CURSOR.store(0, Ordering::Relaxed);

            regs.cfgr1().modify(|w| {
                w.set_discen(true);
                w.set_cont(false);
                w.set_exten(pac::adc::vals::Exten::RISINGEDGE);
                w.set_extsel(EXTSEL_TIM3_TRGO);
            });
            regs.chselr().write(|w| w.0 = SEQUENCE_MASK);
            while !regs.isr().read().ccrdy() {}
            regs.isr().write(|w| w.set_ccrdy(true));

            regs.ier().modify(|w| w.set_eocie(true));
            if !regs.cr().read().aden() {
                regs.cr().modify(|w| w.set_aden(true));
                while !regs.isr().read().adrdy() {}
            }
            // With an external trigger selected this only arms the converter.
            regs.cr().modify(|w| w.set_adstart(true));

            self.timer.set_frequency(Hertz(ADC_TRIGGER_HZ));
            self.timer
                .regs_core()
                .cr2()
                .modify(|w| w.set_mms(pac::timer::vals::Mms::UPDATE));

            unsafe { interrupt::ADC1_COMP.enable() };
            self.timer.start();
            info!("ADC armed, trigger at {} Hz", ADC_TRIGGER_HZ);
        }

        /// Stop conversions and mask the conversion-complete interrupt.
        pub fn halt(&mut self) {
            let regs = pac::ADC1;
            interrupt::ADC1_COMP.disable();
            self.timer.stop();
            regs.ier().modify(|w| w.set_eocie(false));
            if regs.cr().read().adstart() {
                regs.cr().modify(|w| w.set_adstp(true));
                while regs.cr().read().adstp() {}
            }
            warn!("ADC halted");
        }
    }

    /// Register view used inside the interrupt handler.
    pub struct ConversionRegs;

    impl Converter for ConversionRegs {
        fn selected_channel(&self) -> u8 {
            let cursor = CURSOR.load(Ordering::Relaxed);
            let end_of_sequence = pac::ADC1.isr().read().eos();
            // EOS must coincide with the last channel of the sequence.
            if end_of_sequence != (cursor as usize == ADC_CHANNELS - 1) {
                return CHANNEL_DESYNC;
            }
            cursor
        }

        fn select_channel(&mut self, channel: u8) {
            // The hardware steps through CHSELR by itself; track it.
            CURSOR.store(channel, Ordering::Relaxed);
        }

        fn last_result(&self) -> u16 {
            pac::ADC1.dr().read().data()
        }

        fn clear_complete(&mut self) {
            pac::ADC1.isr().write(|w| {
                w.set_eoc(true);
                w.set_eos(true);
                w.set_ovr(true);
            });
        }
    }
}
