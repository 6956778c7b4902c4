//! Joystick axis identifiers and the input-to-axis value transform

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Highest value an input event carries (7-bit MIDI data byte)
pub const MAX_INPUT: i32 = 127;

/// Full-scale axis position
pub const MAX_AXIS: i32 = 32767;

/// Joystick axis identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AxisId {
    X,
    Y,
    Z,
    RX,
    RY,
    RZ,
    SL0,
    SL1,
}

impl AxisId {
    /// All available axis IDs
    pub const ALL: &'static [AxisId] = &[
        AxisId::X,
        AxisId::Y,
        AxisId::Z,
        AxisId::RX,
        AxisId::RY,
        AxisId::RZ,
        AxisId::SL0,
        AxisId::SL1,
    ];

    /// Get display name for the axis
    pub fn display_name(&self) -> &'static str {
        match self {
            AxisId::X => "X",
            AxisId::Y => "Y",
            AxisId::Z => "Z",
            AxisId::RX => "RX",
            AxisId::RY => "RY",
            AxisId::RZ => "RZ",
            AxisId::SL0 => "SL0",
            AxisId::SL1 => "SL1",
        }
    }

    /// Lowercase name as written in mapping rules
    pub fn rule_name(&self) -> &'static str {
        match self {
            AxisId::X => "x",
            AxisId::Y => "y",
            AxisId::Z => "z",
            AxisId::RX => "rx",
            AxisId::RY => "ry",
            AxisId::RZ => "rz",
            AxisId::SL0 => "sl0",
            AxisId::SL1 => "sl1",
        }
    }
}

impl fmt::Display for AxisId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Axis name that is not one of x, y, z, rx, ry, rz, sl0, sl1
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown axis \"{0}\" (expected one of x, y, z, rx, ry, rz, sl0, sl1)")]
pub struct UnknownAxis(pub String);

impl FromStr for AxisId {
    type Err = UnknownAxis;

    /// Case-insensitive
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AxisId::ALL
            .iter()
            .copied()
            .find(|axis| axis.rule_name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownAxis(s.to_string()))
    }
}

impl Serialize for AxisId {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(self.rule_name())
    }
}

impl<'de> Deserialize<'de> for AxisId {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let name = String::deserialize(d)?;
        name.parse().map_err(serde::de::Error::custom)
    }
}

/// Scale an input value in `[0, MAX_INPUT]` to an axis position in `[0, MAX_AXIS]`.
///
/// Rounds half away from zero using exact integer arithmetic. `MAX_INPUT` is
/// odd, so `value * MAX_AXIS / MAX_INPUT` never lands exactly on a half and
/// round-half-to-even would give the same results.
///
/// Returns `None` for values outside the input domain.
pub fn scale_to_axis(value: i32) -> Option<i32> {
    if !(0..=MAX_INPUT).contains(&value) {
        return None;
    }
    Some((value * MAX_AXIS + MAX_INPUT / 2) / MAX_INPUT)
}
