//! Output device abstraction
//!
//! The router only talks to virtual joysticks through [`OutputDevice`], so the
//! same routing logic drives a uinput backend, a dry-run logger or a test fake.

use crate::axis::AxisId;
use crate::error::DeviceError;
use std::fmt;
use std::num::NonZeroU32;

/// Ownership state of a virtual joystick slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceStatus {
    /// Already acquired by this process
    Owned,
    /// Free to acquire
    Free,
    /// Acquired by another process
    Busy,
    /// Slot does not exist
    Missing,
    /// Any other driver condition
    Error(String),
}

impl DeviceStatus {
    /// Whether startup may go on to acquire the device
    pub fn is_available(&self) -> bool {
        matches!(self, DeviceStatus::Owned | DeviceStatus::Free)
    }
}

impl fmt::Display for DeviceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceStatus::Owned => f.write_str("owned"),
            DeviceStatus::Free => f.write_str("free"),
            DeviceStatus::Busy => f.write_str("busy"),
            DeviceStatus::Missing => f.write_str("missing"),
            DeviceStatus::Error(reason) => write!(f, "error ({reason})"),
        }
    }
}

/// A driver managing numbered virtual joystick slots
pub trait OutputDevice: Send {
    /// Whether the driver is usable at all
    fn driver_enabled(&self) -> bool {
        true
    }

    /// Driver version string, for logging
    fn driver_version(&self) -> Option<String> {
        None
    }

    /// Highest 1-based button index a slot supports
    fn max_buttons(&self) -> u32 {
        u32::MAX
    }

    /// Query the ownership state of a slot
    fn status(&self, device_id: u32) -> DeviceStatus;

    /// Claim a slot for this process
    fn acquire(&mut self, device_id: u32) -> Result<(), DeviceError>;

    /// Give a slot back
    fn release(&mut self, device_id: u32);

    /// Release all buttons and move all axes to their neutral position
    fn reset(&mut self, device_id: u32) -> Result<(), DeviceError>;

    /// Press or release a 1-based button
    fn set_button(
        &mut self,
        device_id: u32,
        button: NonZeroU32,
        pressed: bool,
    ) -> Result<(), DeviceError>;

    /// Move an axis to `value` in `[0, MAX_AXIS]`
    fn set_axis(&mut self, device_id: u32, axis: AxisId, value: i32) -> Result<(), DeviceError>;
}
