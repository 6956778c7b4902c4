//! Virtual joystick slots using evdev/uinput
//!
//! Slots are numbered 1..=16. Acquiring a slot takes an advisory lock on a
//! per-slot lock file and creates a virtual joystick that appears as a
//! standard gamepad to games and applications. Another process holding the
//! lock makes the slot `Busy`.

use evdev::{
    uinput::{VirtualDevice, VirtualDeviceBuilder},
    AbsInfo, AbsoluteAxisType, AttributeSet, EventType, InputEvent, Key, UinputAbsSetup,
};
use midi2joy_core::{AxisId, DeviceError, DeviceStatus, OutputDevice, MAX_AXIS};
use std::collections::{BTreeMap, HashMap};
use std::fs::{File, OpenOptions};
use std::io;
use std::num::NonZeroU32;
use std::os::unix::io::AsRawFd;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Highest slot id
pub const MAX_DEVICES: u32 = 16;

/// Buttons per joystick: BTN_TRIGGER..BTN_DEAD, then BTN_TRIGGER_HAPPY1..40
pub const MAX_BUTTONS: u32 = 56;

const JOYSTICK_BUTTONS: u16 = 16;
const BTN_TRIGGER: u16 = 0x120;
const BTN_TRIGGER_HAPPY1: u16 = 0x2c0;

const UINPUT_PATH: &str = "/dev/uinput";

/// Key code for a 1-based button index
fn button_code(button: u32) -> Option<Key> {
    if button == 0 || button > MAX_BUTTONS {
        return None;
    }
    let index = (button - 1) as u16;
    let code = if index < JOYSTICK_BUTTONS {
        BTN_TRIGGER + index
    } else {
        BTN_TRIGGER_HAPPY1 + (index - JOYSTICK_BUTTONS)
    };
    Some(Key::new(code))
}

/// Convert our AxisId to evdev AbsoluteAxisType
fn axis_id_to_code(axis: AxisId) -> AbsoluteAxisType {
    match axis {
        AxisId::X => AbsoluteAxisType::ABS_X,
        AxisId::Y => AbsoluteAxisType::ABS_Y,
        AxisId::Z => AbsoluteAxisType::ABS_Z,
        AxisId::RX => AbsoluteAxisType::ABS_RX,
        AxisId::RY => AbsoluteAxisType::ABS_RY,
        AxisId::RZ => AbsoluteAxisType::ABS_RZ,
        AxisId::SL0 => AbsoluteAxisType::ABS_THROTTLE,
        AxisId::SL1 => AbsoluteAxisType::ABS_RUDDER,
    }
}

/// One virtual joystick device with every axis and button enabled
pub struct VirtualJoystick {
    device: VirtualDevice,
    /// Current axis values (for change detection)
    axis_values: HashMap<AxisId, i32>,
    /// Current button states by key code (for change detection)
    buttons: HashMap<u16, bool>,
}

impl VirtualJoystick {
    /// Create a new virtual joystick device
    ///
    /// `name` is shown in `evtest` and game controller settings.
    pub fn new(name: &str) -> Result<Self, DeviceError> {
        let mut builder = VirtualDeviceBuilder::new()?.name(name);

        let mut keys = AttributeSet::<Key>::new();
        for button in 1..=MAX_BUTTONS {
            if let Some(key) = button_code(button) {
                keys.insert(key);
            }
        }
        builder = builder.with_keys(&keys)?;

        for &axis in AxisId::ALL {
            let abs_setup =
                UinputAbsSetup::new(axis_id_to_code(axis), AbsInfo::new(0, 0, MAX_AXIS, 0, 0, 1));
            builder = builder.with_absolute_axis(&abs_setup)?;
        }

        let device = builder.build()?;

        Ok(Self {
            device,
            axis_values: AxisId::ALL.iter().map(|&axis| (axis, 0)).collect(),
            buttons: HashMap::new(),
        })
    }

    /// Set an axis value
    ///
    /// Only emits events if the value has changed.
    pub fn set_axis(&mut self, axis: AxisId, value: i32) -> Result<(), DeviceError> {
        let clamped = value.clamp(0, MAX_AXIS);
        if self.axis_values.get(&axis) == Some(&clamped) {
            return Ok(());
        }

        let code = axis_id_to_code(axis);
        self.device
            .emit(&[InputEvent::new_now(EventType::ABSOLUTE, code.0, clamped)])?;
        self.axis_values.insert(axis, clamped);
        Ok(())
    }

    /// Press or release a button
    ///
    /// Only emits events if the state has changed.
    pub fn set_button(&mut self, key: Key, pressed: bool) -> Result<(), DeviceError> {
        if self.buttons.get(&key.code()).copied().unwrap_or(false) == pressed {
            return Ok(());
        }

        self.device
            .emit(&[InputEvent::new_now(EventType::KEY, key.code(), pressed as i32)])?;
        self.buttons.insert(key.code(), pressed);
        Ok(())
    }

    /// Release every button and move every axis to 0, in a single report
    pub fn reset(&mut self) -> Result<(), DeviceError> {
        let mut events: Vec<InputEvent> = AxisId::ALL
            .iter()
            .map(|&axis| InputEvent::new_now(EventType::ABSOLUTE, axis_id_to_code(axis).0, 0))
            .collect();
        events.extend(
            (1..=MAX_BUTTONS)
                .filter_map(button_code)
                .map(|key| InputEvent::new_now(EventType::KEY, key.code(), 0)),
        );

        self.device.emit(&events)?;
        for value in self.axis_values.values_mut() {
            *value = 0;
        }
        self.buttons.clear();
        Ok(())
    }

    /// Get the device path (e.g., /dev/input/eventX)
    pub fn device_path(&mut self) -> Option<PathBuf> {
        self.device
            .enumerate_dev_nodes_blocking()
            .ok()?
            .next()?
            .ok()
    }
}

/// Take the slot lock without blocking. `Ok(None)` means another holder has it.
fn try_lock(path: &Path) -> io::Result<Option<File>> {
    let file = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .open(path)?;

    if unsafe { libc::flock(file.as_raw_fd(), libc::LOCK_EX | libc::LOCK_NB) } == 0 {
        return Ok(Some(file));
    }

    let err = io::Error::last_os_error();
    if err.raw_os_error() == Some(libc::EWOULDBLOCK) {
        Ok(None)
    } else {
        Err(err)
    }
}

struct Slot {
    joystick: VirtualJoystick,
    // Held for as long as the slot is acquired
    _lock: File,
}

/// uinput-backed joystick slots
pub struct UinputJoysticks {
    name_prefix: String,
    lock_dir: PathBuf,
    slots: BTreeMap<u32, Slot>,
}

impl UinputJoysticks {
    pub fn new(name_prefix: impl Into<String>) -> Self {
        Self::with_lock_dir(name_prefix, Self::default_lock_dir())
    }

    pub fn with_lock_dir(name_prefix: impl Into<String>, lock_dir: PathBuf) -> Self {
        Self {
            name_prefix: name_prefix.into(),
            lock_dir,
            slots: BTreeMap::new(),
        }
    }

    /// `$XDG_RUNTIME_DIR`, falling back to the system temp dir
    pub fn default_lock_dir() -> PathBuf {
        dirs::runtime_dir().unwrap_or_else(std::env::temp_dir)
    }

    fn lock_path(&self, device_id: u32) -> PathBuf {
        self.lock_dir.join(format!("midi2joy-joystick-{device_id}.lock"))
    }

    fn slot_exists(device_id: u32) -> bool {
        (1..=MAX_DEVICES).contains(&device_id)
    }

    fn slot_mut(&mut self, device_id: u32) -> Result<&mut VirtualJoystick, DeviceError> {
        self.slots
            .get_mut(&device_id)
            .map(|slot| &mut slot.joystick)
            .ok_or(DeviceError::NotAcquired(device_id))
    }
}

impl OutputDevice for UinputJoysticks {
    fn driver_enabled(&self) -> bool {
        OpenOptions::new().write(true).open(UINPUT_PATH).is_ok()
    }

    fn driver_version(&self) -> Option<String> {
        Some(format!("uinput ({UINPUT_PATH})"))
    }

    fn max_buttons(&self) -> u32 {
        MAX_BUTTONS
    }

    fn status(&self, device_id: u32) -> DeviceStatus {
        if self.slots.contains_key(&device_id) {
            return DeviceStatus::Owned;
        }
        if !Self::slot_exists(device_id) {
            return DeviceStatus::Missing;
        }
        match try_lock(&self.lock_path(device_id)) {
            // Dropping the file releases the status-check lock again
            Ok(Some(_)) => DeviceStatus::Free,
            Ok(None) => DeviceStatus::Busy,
            Err(e) => DeviceStatus::Error(e.to_string()),
        }
    }

    fn acquire(&mut self, device_id: u32) -> Result<(), DeviceError> {
        if self.slots.contains_key(&device_id) {
            return Ok(());
        }
        if !Self::slot_exists(device_id) {
            return Err(DeviceError::NoSuchDevice(device_id));
        }

        let lock = try_lock(&self.lock_path(device_id))?.ok_or(DeviceError::Busy(device_id))?;
        let name = format!("{} {}", self.name_prefix, device_id);
        let mut joystick = VirtualJoystick::new(&name)?;
        info!("Created virtual joystick: {}", name);
        if let Some(path) = joystick.device_path() {
            info!("Device path: {}", path.display());
        }

        self.slots.insert(
            device_id,
            Slot {
                joystick,
                _lock: lock,
            },
        );
        Ok(())
    }

    fn release(&mut self, device_id: u32) {
        if self.slots.remove(&device_id).is_some() {
            debug!("Released joystick {}", device_id);
        }
    }

    fn reset(&mut self, device_id: u32) -> Result<(), DeviceError> {
        self.slot_mut(device_id)?.reset()
    }

    fn set_button(
        &mut self,
        device_id: u32,
        button: NonZeroU32,
        pressed: bool,
    ) -> Result<(), DeviceError> {
        let key = button_code(button.get()).ok_or(DeviceError::ButtonOutOfRange {
            device_id,
            button: button.get(),
            max: MAX_BUTTONS,
        })?;
        self.slot_mut(device_id)?.set_button(key, pressed)
    }

    fn set_axis(&mut self, device_id: u32, axis: AxisId, value: i32) -> Result<(), DeviceError> {
        self.slot_mut(device_id)?.set_axis(axis, value)
    }
}
