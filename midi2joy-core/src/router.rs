//! Event router
//!
//! Owns the output device, claims every joystick the mapping table refers
//! to, then turns each input event into at most one device write.

use crate::axis::{scale_to_axis, AxisId, MAX_INPUT};
use crate::device::{DeviceStatus, OutputDevice};
use crate::error::{DeviceError, RouteError, StartupError};
use crate::table::MappingTable;
use crate::target::{MappingKey, OutputTarget};
use std::fmt;
use std::num::NonZeroU32;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// One event from an input device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputEvent {
    pub channel: i32,
    pub identifier: i32,
    /// 0..=127 for well-formed input
    pub value: i32,
}

impl InputEvent {
    pub fn new(channel: i32, identifier: i32, value: i32) -> Self {
        Self {
            channel,
            identifier,
            value,
        }
    }

    pub fn key(&self) -> MappingKey {
        MappingKey::new(self.channel, self.identifier)
    }
}

/// A single device write produced by routing an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputCommand {
    SetButton {
        device_id: u32,
        button: NonZeroU32,
        pressed: bool,
    },
    SetAxis {
        device_id: u32,
        axis: AxisId,
        value: i32,
    },
}

impl OutputCommand {
    /// Compute the command for `value` arriving at `target`.
    ///
    /// Returns `None` if the value is outside `0..=127`.
    pub fn for_target(target: OutputTarget, value: i32) -> Option<Self> {
        if !(0..=MAX_INPUT).contains(&value) {
            return None;
        }
        match target {
            OutputTarget::Button { device_id, button } => Some(OutputCommand::SetButton {
                device_id,
                button,
                pressed: value != 0,
            }),
            OutputTarget::Axis { device_id, axis } => Some(OutputCommand::SetAxis {
                device_id,
                axis,
                value: scale_to_axis(value)?,
            }),
        }
    }

    /// Issue the command to a device
    pub fn apply<D: OutputDevice + ?Sized>(&self, device: &mut D) -> Result<(), DeviceError> {
        match *self {
            OutputCommand::SetButton {
                device_id,
                button,
                pressed,
            } => device.set_button(device_id, button, pressed),
            OutputCommand::SetAxis {
                device_id,
                axis,
                value,
            } => device.set_axis(device_id, axis, value),
        }
    }

    fn target(&self) -> OutputTarget {
        match *self {
            OutputCommand::SetButton {
                device_id, button, ..
            } => OutputTarget::Button { device_id, button },
            OutputCommand::SetAxis {
                device_id, axis, ..
            } => OutputTarget::Axis { device_id, axis },
        }
    }
}

impl fmt::Display for OutputCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputCommand::SetButton {
                device_id,
                button,
                pressed,
            } => write!(f, "joystick {device_id}, set button {button} = {pressed}"),
            OutputCommand::SetAxis {
                device_id,
                axis,
                value,
            } => write!(f, "joystick {device_id}, set axis {axis} = {value}"),
        }
    }
}

/// Router lifecycle. There is no way back from `Running`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouterState {
    Uninitialized,
    Running,
}

pub struct EventRouter<D: OutputDevice> {
    table: Arc<MappingTable>,
    device: D,
    state: RouterState,
}

impl<D: OutputDevice> EventRouter<D> {
    pub fn new(table: Arc<MappingTable>, device: D) -> Self {
        Self {
            table,
            device,
            state: RouterState::Uninitialized,
        }
    }

    pub fn state(&self) -> RouterState {
        self.state
    }

    pub fn table(&self) -> &MappingTable {
        &self.table
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    pub fn into_device(self) -> D {
        self.device
    }

    /// Claim and reset every joystick referenced by the table.
    ///
    /// Either every device ends up acquired and reset and the router is
    /// `Running`, or nothing new stays acquired and the router stays
    /// `Uninitialized`.
    pub fn start(&mut self) -> Result<(), StartupError> {
        if self.state == RouterState::Running {
            return Err(StartupError::AlreadyRunning);
        }

        if !self.device.driver_enabled() {
            error!("Output driver not enabled");
            return Err(StartupError::DriverDisabled);
        }
        if let Some(version) = self.device.driver_version() {
            info!("Output driver version {}", version);
        }

        let max = self.device.max_buttons();
        let too_high = self.table.iter().find_map(|(_, target)| match target {
            OutputTarget::Button { device_id, button } if button.get() > max => {
                Some((device_id, button.get()))
            }
            _ => None,
        });
        if let Some((device_id, button)) = too_high {
            error!("Joystick {} has no button {} (max {})", device_id, button, max);
            return Err(StartupError::UnsupportedButton {
                device_id,
                button,
                max,
            });
        }

        let mut pending = Vec::with_capacity(self.table.device_ids().len());
        for &device_id in self.table.device_ids() {
            let status = self.device.status(device_id);
            if !status.is_available() {
                error!("Joystick {} {}", device_id, status);
                return Err(StartupError::DeviceUnavailable { device_id, status });
            }
            pending.push((device_id, status));
        }

        // Only devices this call acquires get released again on failure
        let mut newly_acquired = Vec::new();
        for &(device_id, ref status) in &pending {
            if let Err(source) = self.device.acquire(device_id) {
                error!("Failed to acquire joystick {}: {}", device_id, source);
                self.release_all(&newly_acquired);
                return Err(StartupError::AcquireFailed { device_id, source });
            }
            if *status == DeviceStatus::Free {
                newly_acquired.push(device_id);
            }
            info!("Acquired: joystick {}", device_id);
        }

        for &(device_id, _) in &pending {
            if let Err(source) = self.device.reset(device_id) {
                error!("Failed to reset joystick {}: {}", device_id, source);
                self.release_all(&newly_acquired);
                return Err(StartupError::ResetFailed { device_id, source });
            }
        }

        self.state = RouterState::Running;
        Ok(())
    }

    fn release_all(&mut self, device_ids: &[u32]) {
        for &device_id in device_ids {
            self.device.release(device_id);
        }
    }

    /// Route one input event.
    ///
    /// `Ok(None)` means the event is unmapped and nothing was written. Errors
    /// are logged here; callers only need to keep going.
    pub fn route(&mut self, event: InputEvent) -> Result<Option<OutputCommand>, RouteError> {
        debug!(
            "MIDI input, channel {} identifier {} value {}",
            event.channel, event.identifier, event.value
        );

        if self.state != RouterState::Running {
            warn!("Dropping event before startup completed");
            return Err(RouteError::NotRunning);
        }

        let Some(target) = self.table.resolve(event.channel, event.identifier) else {
            return Ok(None);
        };

        let Some(command) = OutputCommand::for_target(target, event.value) else {
            warn!(
                "Ignoring out-of-range value {} for {}",
                event.value,
                event.key()
            );
            return Err(RouteError::ValueOutOfRange {
                key: event.key(),
                value: event.value,
            });
        };

        debug!("{}", command);
        if let Err(source) = command.apply(&mut self.device) {
            warn!("Failed to update {}: {}", command.target(), source);
            return Err(RouteError::Output {
                target: command.target(),
                source,
            });
        }
        Ok(Some(command))
    }
}
