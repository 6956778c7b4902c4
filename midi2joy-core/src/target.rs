//! Mapping keys and output targets

use crate::axis::AxisId;
use std::fmt;
use std::num::NonZeroU32;

/// Lookup key for an input event: `(channel, identifier)`
///
/// For MIDI input the identifier is the first data byte (note or controller number).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MappingKey {
    pub channel: i32,
    pub identifier: i32,
}

impl MappingKey {
    pub fn new(channel: i32, identifier: i32) -> Self {
        Self {
            channel,
            identifier,
        }
    }
}

impl fmt::Display for MappingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "channel {} identifier {}", self.channel, self.identifier)
    }
}

/// Where a mapped input event ends up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputTarget {
    /// A 1-based button on a virtual joystick
    Button { device_id: u32, button: NonZeroU32 },
    /// A continuous axis on a virtual joystick
    Axis { device_id: u32, axis: AxisId },
}

impl OutputTarget {
    /// Device this target writes to
    pub fn device_id(&self) -> u32 {
        match self {
            OutputTarget::Button { device_id, .. } | OutputTarget::Axis { device_id, .. } => {
                *device_id
            }
        }
    }
}

impl fmt::Display for OutputTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputTarget::Button { device_id, button } => {
                write!(f, "joystick {device_id} button {button}")
            }
            OutputTarget::Axis { device_id, axis } => {
                write!(f, "joystick {device_id} axis {axis}")
            }
        }
    }
}
