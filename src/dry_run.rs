//! Output backend that only logs
//!
//! Every slot is free and every write succeeds. Useful for checking a
//! mapping against a real controller without touching uinput.

use midi2joy_core::{AxisId, DeviceError, DeviceStatus, OutputDevice};
use std::collections::BTreeSet;
use std::num::NonZeroU32;
use tracing::info;

#[derive(Debug, Default)]
pub struct LoggingDevice {
    acquired: BTreeSet<u32>,
}

impl LoggingDevice {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn acquired(&self) -> &BTreeSet<u32> {
        &self.acquired
    }

    fn check(&self, device_id: u32) -> Result<(), DeviceError> {
        if self.acquired.contains(&device_id) {
            Ok(())
        } else {
            Err(DeviceError::NotAcquired(device_id))
        }
    }
}

impl OutputDevice for LoggingDevice {
    fn driver_version(&self) -> Option<String> {
        Some("dry-run".to_string())
    }

    fn status(&self, device_id: u32) -> DeviceStatus {
        if self.acquired.contains(&device_id) {
            DeviceStatus::Owned
        } else {
            DeviceStatus::Free
        }
    }

    fn acquire(&mut self, device_id: u32) -> Result<(), DeviceError> {
        info!("[dry-run] acquire joystick {}", device_id);
        self.acquired.insert(device_id);
        Ok(())
    }

    fn release(&mut self, device_id: u32) {
        if self.acquired.remove(&device_id) {
            info!("[dry-run] release joystick {}", device_id);
        }
    }

    fn reset(&mut self, device_id: u32) -> Result<(), DeviceError> {
        self.check(device_id)?;
        info!("[dry-run] reset joystick {}", device_id);
        Ok(())
    }

    fn set_button(
        &mut self,
        device_id: u32,
        button: NonZeroU32,
        pressed: bool,
    ) -> Result<(), DeviceError> {
        self.check(device_id)?;
        info!(
            "[dry-run] joystick {} button {} {}",
            device_id,
            button,
            if pressed { "down" } else { "up" }
        );
        Ok(())
    }

    fn set_axis(&mut self, device_id: u32, axis: AxisId, value: i32) -> Result<(), DeviceError> {
        self.check(device_id)?;
        info!("[dry-run] joystick {} axis {} = {}", device_id, axis, value);
        Ok(())
    }
}
