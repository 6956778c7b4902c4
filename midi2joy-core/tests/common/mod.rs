//! Recording fake for the output device

#![allow(dead_code)]

use midi2joy_core::{AxisId, DeviceError, DeviceStatus, OutputDevice};
use std::collections::{BTreeSet, HashMap};
use std::num::NonZeroU32;

/// Every call the router made, in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Acquire(u32),
    Release(u32),
    Reset(u32),
    SetButton(u32, u32, bool),
    SetAxis(u32, AxisId, i32),
}

#[derive(Default)]
pub struct RecordingDevice {
    pub calls: Vec<Call>,
    pub statuses: HashMap<u32, DeviceStatus>,
    pub owned: BTreeSet<u32>,
    pub fail_acquire: BTreeSet<u32>,
    pub fail_reset: BTreeSet<u32>,
    pub fail_writes: bool,
    pub disabled: bool,
    pub button_limit: Option<u32>,
}

impl RecordingDevice {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_status(mut self, device_id: u32, status: DeviceStatus) -> Self {
        self.statuses.insert(device_id, status);
        self
    }

    /// Calls that write joystick state
    pub fn writes(&self) -> Vec<Call> {
        self.calls
            .iter()
            .filter(|c| matches!(c, Call::SetButton(..) | Call::SetAxis(..)))
            .cloned()
            .collect()
    }
}

impl OutputDevice for RecordingDevice {
    fn driver_enabled(&self) -> bool {
        !self.disabled
    }

    fn max_buttons(&self) -> u32 {
        self.button_limit.unwrap_or(u32::MAX)
    }

    fn status(&self, device_id: u32) -> DeviceStatus {
        if self.owned.contains(&device_id) {
            return DeviceStatus::Owned;
        }
        self.statuses
            .get(&device_id)
            .cloned()
            .unwrap_or(DeviceStatus::Free)
    }

    fn acquire(&mut self, device_id: u32) -> Result<(), DeviceError> {
        self.calls.push(Call::Acquire(device_id));
        if self.fail_acquire.contains(&device_id) {
            return Err(DeviceError::Busy(device_id));
        }
        self.owned.insert(device_id);
        Ok(())
    }

    fn release(&mut self, device_id: u32) {
        self.calls.push(Call::Release(device_id));
        self.owned.remove(&device_id);
    }

    fn reset(&mut self, device_id: u32) -> Result<(), DeviceError> {
        self.calls.push(Call::Reset(device_id));
        if self.fail_reset.contains(&device_id) {
            return Err(DeviceError::Driver("reset rejected".into()));
        }
        Ok(())
    }

    fn set_button(
        &mut self,
        device_id: u32,
        button: NonZeroU32,
        pressed: bool,
    ) -> Result<(), DeviceError> {
        if self.fail_writes {
            return Err(DeviceError::Driver("write rejected".into()));
        }
        self.calls
            .push(Call::SetButton(device_id, button.get(), pressed));
        Ok(())
    }

    fn set_axis(&mut self, device_id: u32, axis: AxisId, value: i32) -> Result<(), DeviceError> {
        if self.fail_writes {
            return Err(DeviceError::Driver("write rejected".into()));
        }
        self.calls.push(Call::SetAxis(device_id, axis, value));
        Ok(())
    }
}
