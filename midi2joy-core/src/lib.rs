//! Mapping table and event router for MIDI-to-joystick translation
//!
//! Input events are `(channel, identifier, value)` triples. A [`MappingTable`]
//! built from [`MappingRule`]s resolves each `(channel, identifier)` to a
//! joystick button or axis, and an [`EventRouter`] writes the resulting state
//! to an [`OutputDevice`].

pub mod axis;
pub mod device;
pub mod dispatch;
pub mod error;
pub mod router;
pub mod rule;
pub mod table;
pub mod target;

pub use axis::{scale_to_axis, AxisId, UnknownAxis, MAX_AXIS, MAX_INPUT};
pub use device::{DeviceStatus, OutputDevice};
pub use dispatch::{event_channel, run_router, EventReceiver, EventSender, RouterStats};
pub use error::{ConfigError, DeviceError, MappingError, RouteError, RuleParseError, StartupError};
pub use router::{EventRouter, InputEvent, OutputCommand, RouterState};
pub use rule::{parse_rules, AxisRule, ButtonRule, IdentifierRange, MappingRule, MAX_RANGE_LEN};
pub use table::MappingTable;
pub use target::{MappingKey, OutputTarget};
