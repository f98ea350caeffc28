#![cfg_attr(not(test), no_std)]

#[macro_use]
mod fmt;

#[cfg(target_os = "none")]
pub mod board;
pub mod config;
pub mod drivers;
pub mod ipc;
pub mod isqrt;
pub mod tasks;

#[cfg(target_os = "none")]
pub use board::Board;
pub use ipc::{SampleCell, SAMPLES};
pub use isqrt::isqrt;
