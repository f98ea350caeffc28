#![cfg_attr(target_os = "none", no_std)]
#![cfg_attr(target_os = "none", no_main)]

#[cfg(target_os = "none")]
use {
    accel_indicator::{
        config::WINDOW,
        drivers::adc::ConversionRegs,
        tasks::{aggregator_task, on_conversion_complete, report_task, sampler::Outcome},
        Board, SAMPLES,
    },
    core::fmt::Write,
    defmt::{error, info, unwrap},
    defmt_rtt as _,
    embassy_executor::Spawner,
    embassy_stm32::interrupt,
    panic_probe as _,
};

// Conversion complete. Everything else in the firmware runs in thread mode.
#[cfg(target_os = "none")]
#[interrupt]
unsafe fn ADC1_COMP() {
    if let Outcome::BadChannel(raw) = on_conversion_complete(&mut ConversionRegs, &SAMPLES) {
        error!("ADC reported channel {}", raw);
    }
}

#[cfg(target_os = "none")]
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Starting accel-indicator");
    let Board {
        adc,
        leds,
        mut console,
    } = unwrap!(Board::init());

    let _ = write!(console, "\naccel-indicator: {} samples per axis per update\n", WINDOW);

    spawner.spawn(report_task()).unwrap();
    spawner.spawn(aggregator_task(adc, leds, console)).unwrap();
    info!("Sampling tasks spawned");

    core::future::pending::<()>().await;
}

#[cfg(not(target_os = "none"))]
fn main() {}
