#![cfg_attr(not(test), no_std)]

//! # Greenhouse Sentinel
//! ## Access-controlled environmental monitor for a small greenhouse
//!
//! Features:
//! - Keypad password gate with lockout after three wrong codes
//! - Temperature and humidity watch with an alarm above 30C and 70% RH
//! - Ambient light watch with a low-light alarm
//! - Buzzer and RGB indicator alarm output
//! - Rolling averages and heat index on a 16x2 LCD
//!
//! Everything runs from one cooperative loop: periodic tasks are polled,
//! then the state machine reacts to the last event they raised.

#[macro_use]
mod fmt;

pub mod actuators;
pub mod alarm;
pub mod average;
pub mod climate;
pub mod config;
pub mod gate;
pub mod greenhouse;
pub mod light;
pub mod machine;
pub mod rendering;
pub mod sensors;
pub mod signal;
pub mod timer;

#[cfg(feature = "rp2040")]
pub mod board;

#[cfg(test)]
mod testing;

pub use greenhouse::{Devices, Greenhouse, TaskId};
pub use machine::State;
pub use signal::Input;
