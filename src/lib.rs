#![cfg_attr(not(test), no_std)]

mod error;

pub mod commands;
pub mod config;
pub mod display;
pub mod frame;
pub mod interface;
mod log;
pub mod params;
pub mod text;
pub mod thermocouple;

pub use crate::display::{I2cLcd, Lcd};
pub use crate::error::{Error, Result};
pub use crate::thermocouple::{Max31855, Reading};
