//! MIDI to virtual joystick converter
//!
//! Reads MIDI controller input and drives virtual joysticks according to a
//! set of mapping rules.

pub mod cli;
pub mod config;
pub mod dry_run;
#[cfg(target_os = "linux")]
pub mod joystick;
pub mod midi;
pub mod runtime;
