use embassy_stm32::adc::Adc;
use embassy_stm32::gpio::{Level, Output, Speed};
use embassy_stm32::mode::Blocking;
use embassy_stm32::timer::low_level::Timer;
use embassy_stm32::usart::{self, Config as UsartConfig, UartTx};
use embassy_stm32::{rcc, Config};

use crate::config::{LED_THRESHOLDS, UART_BAUDRATE};
use crate::drivers::adc::TriggeredAdc;
use crate::drivers::{Console, LedBank};

// ── Board struct ──────────────────────────────────────────
pub struct Board {
    pub adc: TriggeredAdc,
    pub leds: LedBank<Output<'static>>,
    pub console: Console<UartTx<'static, Blocking>>,
}

impl Board {
    pub fn init() -> Result<Self, usart::ConfigError> {
        let mut config = Config::default();

        // HSI16 -> PLL -> 64MHz SYSCLK
        config.rcc.hsi = Some(rcc::Hsi {
            sys_div: rcc::HsiSysDiv::DIV1,
        });
        config.rcc.pll = Some(rcc::Pll {
            source: rcc::PllSource::HSI,    // Use HSI as PLL source
            prediv: rcc::PllPreDiv::DIV2,   // 16MHz / 2 = 8MHz
            mul: rcc::PllMul::MUL16,        // 8MHz * 16 = 128MHz
            divp: None,                     // Not used
            divq: None,                     // Not used
            divr: Some(rcc::PllRDiv::DIV2), // 128MHz / 2 = 64MHz
        });
        config.rcc.sys = rcc::Sysclk::PLL1_R;
        let p = embassy_stm32::init(config);
        info!("clocks up");

        // Bar graph on PB3/PB5/PB7, bottom first. Dark until the first window.
        let leds = LedBank::new(
            [
                Output::new(p.PB3, Level::Low, Speed::Low),
                Output::new(p.PB5, Level::Low, Speed::Low),
                Output::new(p.PB7, Level::Low, Speed::Low),
            ],
            LED_THRESHOLDS,
        );

        // Diagnostic serial, TX only, 8N1
        let mut us_cfg = UsartConfig::default();
        us_cfg.baudrate = UART_BAUDRATE;
        let tx = UartTx::new_blocking(p.USART1, p.PC4, us_cfg)?;
        info!("console on USART1 at {} baud", UART_BAUDRATE);

        // Accelerometer X/Y/Z on PA0/PA1/PA2 (ADC_IN0..2). G0 GPIOs leave
        // reset in analog mode, so the pins need no setup.
        let adc = TriggeredAdc::new(Adc::new(p.ADC1), Timer::new(p.TIM3));
        info!("ADC calibrated");

        Ok(Self {
            adc,
            leds,
            console: Console::new(tx),
        })
    }
}
