//! Error types for rule parsing, table construction, startup and routing

use crate::axis::UnknownAxis;
use crate::device::DeviceStatus;
use crate::target::{MappingKey, OutputTarget};
use thiserror::Error;

/// A mapping rule string that does not follow the rule grammar
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuleParseError {
    #[error("expected 4 comma-separated fields, found {found}")]
    WrongFieldCount { found: usize },

    #[error("invalid channel \"{0}\"")]
    InvalidChannel(String),

    #[error("invalid identifier \"{0}\"")]
    InvalidIdentifier(String),

    #[error("invalid device id \"{0}\"")]
    InvalidDeviceId(String),

    #[error("inverted identifier range {min}-{max}")]
    InvertedRange { min: i32, max: i32 },

    #[error("identifier range {min}-{max} covers more than {limit} identifiers")]
    RangeTooLarge { min: i32, max: i32, limit: u64 },

    #[error(transparent)]
    UnknownAxis(#[from] UnknownAxis),
}

/// A rule that parsed but cannot be added to the mapping table
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MappingError {
    #[error("{key} is already mapped to {existing}")]
    DuplicateKey {
        key: MappingKey,
        existing: OutputTarget,
    },

    #[error("{key} would map to button {index}, buttons start at 1")]
    InvalidButtonIndex { key: MappingKey, index: i64 },
}

/// Fatal configuration problem, reported before any device is touched
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid mapping rule \"{rule}\": {source}")]
    InvalidRule {
        rule: String,
        #[source]
        source: RuleParseError,
    },

    #[error("mapping rule \"{rule}\" rejected: {source}")]
    RuleRejected {
        rule: String,
        #[source]
        source: MappingError,
    },

    #[error("no mapping rules configured")]
    NoRules,
}

/// Errors reported by an output device backend
#[derive(Error, Debug)]
pub enum DeviceError {
    #[error("joystick {0} does not exist")]
    NoSuchDevice(u32),

    #[error("joystick {0} is owned by another process")]
    Busy(u32),

    #[error("joystick {0} has not been acquired")]
    NotAcquired(u32),

    #[error("joystick {device_id} has no button {button} (max {max})")]
    ButtonOutOfRange { device_id: u32, button: u32, max: u32 },

    #[error("driver error: {0}")]
    Driver(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Startup failed; the router stays uninitialized and no event is processed
#[derive(Error, Debug)]
pub enum StartupError {
    #[error("output driver is not enabled")]
    DriverDisabled,

    #[error("joystick {device_id} has no button {button} (max {max})")]
    UnsupportedButton { device_id: u32, button: u32, max: u32 },

    #[error("joystick {device_id} unavailable: {status}")]
    DeviceUnavailable {
        device_id: u32,
        status: DeviceStatus,
    },

    #[error("failed to acquire joystick {device_id}: {source}")]
    AcquireFailed {
        device_id: u32,
        #[source]
        source: DeviceError,
    },

    #[error("failed to reset joystick {device_id}: {source}")]
    ResetFailed {
        device_id: u32,
        #[source]
        source: DeviceError,
    },

    #[error("router is already running")]
    AlreadyRunning,
}

/// A single event could not be routed; the stream continues
#[derive(Error, Debug)]
pub enum RouteError {
    #[error("router has not completed startup")]
    NotRunning,

    #[error("value {value} for {key} is outside 0..=127")]
    ValueOutOfRange { key: MappingKey, value: i32 },

    #[error("failed to update {target}: {source}")]
    Output {
        target: OutputTarget,
        #[source]
        source: DeviceError,
    },
}
