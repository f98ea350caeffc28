pub mod adc;
pub mod console;
pub mod leds;

pub use adc::Converter;
pub use console::Console;
pub use leds::{Band, Indicator, LedBank};
