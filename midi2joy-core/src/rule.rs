//! Mapping rules and their text form
//!
//! Rules are written as four comma-separated fields:
//!
//! - Button: `<channel>,<min>-<max>,<device>,<button offset>` or
//!   `<channel>,<identifier>,<device>,<button offset>`
//! - Axis: `<channel>,<identifier>,<device>,<axis>` with axis one of
//!   `x, y, z, rx, ry, rz, sl0, sl1` (case-insensitive)
//!
//! A rule is a button rule if its last field parses as an integer, otherwise
//! it is an axis rule. Existing command lines depend on this, so it is kept.

use crate::axis::{AxisId, MAX_INPUT};
use crate::error::RuleParseError;
use std::fmt;
use std::str::FromStr;
use tracing::warn;

/// Most identifiers one range may cover (every MIDI data byte value)
pub const MAX_RANGE_LEN: u64 = MAX_INPUT as u64 + 1;

/// Inclusive identifier range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdentifierRange {
    min: i32,
    max: i32,
}

impl IdentifierRange {
    /// Create a range, rejecting `min > max` and ranges longer than
    /// [`MAX_RANGE_LEN`]
    pub fn new(min: i32, max: i32) -> Result<Self, RuleParseError> {
        if min > max {
            return Err(RuleParseError::InvertedRange { min, max });
        }
        let range = Self { min, max };
        if range.len() > MAX_RANGE_LEN {
            return Err(RuleParseError::RangeTooLarge {
                min,
                max,
                limit: MAX_RANGE_LEN,
            });
        }
        Ok(range)
    }

    /// Range holding a single identifier
    pub fn single(identifier: i32) -> Self {
        Self {
            min: identifier,
            max: identifier,
        }
    }

    pub fn min(&self) -> i32 {
        self.min
    }

    pub fn max(&self) -> i32 {
        self.max
    }

    /// Number of identifiers covered
    pub fn len(&self) -> u64 {
        (self.max as i64 - self.min as i64 + 1) as u64
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn is_single(&self) -> bool {
        self.min == self.max
    }

    pub fn iter(&self) -> impl Iterator<Item = i32> {
        self.min..=self.max
    }
}

impl fmt::Display for IdentifierRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_single() {
            write!(f, "{}", self.min)
        } else {
            write!(f, "{}-{}", self.min, self.max)
        }
    }
}

/// Maps a range of identifiers onto consecutive buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ButtonRule {
    pub channel: i32,
    pub identifiers: IdentifierRange,
    pub device_id: u32,
    /// Added to each identifier to get its button index
    pub button_offset: i32,
}

/// Maps one identifier onto an axis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AxisRule {
    pub channel: i32,
    pub identifier: i32,
    pub device_id: u32,
    pub axis: AxisId,
}

/// One line of mapping configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MappingRule {
    Button(ButtonRule),
    Axis(AxisRule),
}

impl fmt::Display for MappingRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MappingRule::Button(rule) => write!(
                f,
                "{},{},{},{}",
                rule.channel, rule.identifiers, rule.device_id, rule.button_offset
            ),
            MappingRule::Axis(rule) => write!(
                f,
                "{},{},{},{}",
                rule.channel,
                rule.identifier,
                rule.device_id,
                rule.axis.rule_name()
            ),
        }
    }
}

impl FromStr for MappingRule {
    type Err = RuleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = s.split(',').map(str::trim).collect();
        let &[channel, identifiers, device_id, last] = fields.as_slice() else {
            return Err(RuleParseError::WrongFieldCount {
                found: fields.len(),
            });
        };

        let channel: i32 = channel
            .parse()
            .map_err(|_| RuleParseError::InvalidChannel(channel.to_string()))?;
        let device_id: u32 = device_id
            .parse()
            .map_err(|_| RuleParseError::InvalidDeviceId(device_id.to_string()))?;
        let identifiers = parse_range(identifiers)?;

        if let Ok(button_offset) = last.parse::<i32>() {
            return Ok(MappingRule::Button(ButtonRule {
                channel,
                identifiers,
                device_id,
                button_offset,
            }));
        }

        let axis: AxisId = last.parse()?;
        if !identifiers.is_single() {
            warn!(
                "Identifier range {} not allowed for axis mapping, using {}",
                identifiers,
                identifiers.min()
            );
        }
        Ok(MappingRule::Axis(AxisRule {
            channel,
            identifier: identifiers.min(),
            device_id,
            axis,
        }))
    }
}

/// Parse `<min>-<max>` or a single identifier
fn parse_range(s: &str) -> Result<IdentifierRange, RuleParseError> {
    let parse = |part: &str| {
        part.trim()
            .parse::<i32>()
            .map_err(|_| RuleParseError::InvalidIdentifier(part.to_string()))
    };

    match s.split_once('-') {
        Some((min, max)) => IdentifierRange::new(parse(min)?, parse(max)?),
        None => Ok(IdentifierRange::single(parse(s)?)),
    }
}

/// Parse every rule, stopping at the first bad one
pub fn parse_rules<I, S>(rules: I) -> Result<Vec<MappingRule>, crate::error::ConfigError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    rules
        .into_iter()
        .map(|text| {
            let text = text.as_ref();
            text.parse()
                .map_err(|source| crate::error::ConfigError::InvalidRule {
                    rule: text.to_string(),
                    source,
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn button(rule: &str) -> ButtonRule {
        match rule.parse::<MappingRule>() {
            Ok(MappingRule::Button(rule)) => rule,
            other => panic!("expected button rule, got {other:?}"),
        }
    }

    fn axis(rule: &str) -> AxisRule {
        match rule.parse::<MappingRule>() {
            Ok(MappingRule::Axis(rule)) => rule,
            other => panic!("expected axis rule, got {other:?}"),
        }
    }

    #[test]
    fn test_button_range_rule() {
        let rule = button("0,23-31,1,-22");
        assert_eq!(rule.channel, 0);
        assert_eq!(rule.identifiers.min(), 23);
        assert_eq!(rule.identifiers.max(), 31);
        assert_eq!(rule.identifiers.len(), 9);
        assert_eq!(rule.device_id, 1);
        assert_eq!(rule.button_offset, -22);
    }

    #[test]
    fn test_button_single_value_rule() {
        let rule = button("3,40,2,5");
        assert!(rule.identifiers.is_single());
        assert_eq!(rule.identifiers.min(), 40);
        assert_eq!(rule.button_offset, 5);
    }

    #[test]
    fn test_axis_rule() {
        let rule = axis("0,14,1,x");
        assert_eq!(rule.channel, 0);
        assert_eq!(rule.identifier, 14);
        assert_eq!(rule.device_id, 1);
        assert_eq!(rule.axis, AxisId::X);

        assert_eq!(axis("0,21,2,SL1").axis, AxisId::SL1);
    }

    #[test]
    fn test_axis_rule_with_range_uses_min() {
        let rule = axis("0,14-20,1,ry");
        assert_eq!(rule.identifier, 14);
        assert_eq!(rule.axis, AxisId::RY);
    }

    #[test]
    fn test_wrong_field_count() {
        assert_eq!(
            "0,23-31,1".parse::<MappingRule>(),
            Err(RuleParseError::WrongFieldCount { found: 3 })
        );
        assert_eq!(
            "0,23-31,1,-22,7".parse::<MappingRule>(),
            Err(RuleParseError::WrongFieldCount { found: 5 })
        );
    }

    #[test]
    fn test_non_numeric_fields() {
        assert_eq!(
            "a,23,1,x".parse::<MappingRule>(),
            Err(RuleParseError::InvalidChannel("a".into()))
        );
        assert_eq!(
            "0,23,joy,x".parse::<MappingRule>(),
            Err(RuleParseError::InvalidDeviceId("joy".into()))
        );
        assert_eq!(
            "0,23,-1,x".parse::<MappingRule>(),
            Err(RuleParseError::InvalidDeviceId("-1".into()))
        );
        assert_eq!(
            "0,2x,1,x".parse::<MappingRule>(),
            Err(RuleParseError::InvalidIdentifier("2x".into()))
        );
    }

    #[test]
    fn test_inverted_range() {
        assert_eq!(
            "0,31-23,1,-22".parse::<MappingRule>(),
            Err(RuleParseError::InvertedRange { min: 31, max: 23 })
        );
    }

    #[test]
    fn test_range_length_is_capped() {
        assert!("0,0-127,1,1".parse::<MappingRule>().is_ok());
        assert_eq!(
            "0,0-128,1,1".parse::<MappingRule>(),
            Err(RuleParseError::RangeTooLarge {
                min: 0,
                max: 128,
                limit: MAX_RANGE_LEN
            })
        );
    }

    #[test]
    fn test_oversized_range_is_a_config_error() {
        let err = parse_rules(["0,14,1,x", "0,0-2147483646,1,1"]).unwrap_err();
        match err {
            crate::error::ConfigError::InvalidRule { rule, source } => {
                assert_eq!(rule, "0,0-2147483646,1,1");
                assert!(matches!(source, RuleParseError::RangeTooLarge { .. }));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_unknown_axis() {
        assert!(matches!(
            "0,14,1,w".parse::<MappingRule>(),
            Err(RuleParseError::UnknownAxis(_))
        ));
    }

    #[test]
    fn test_display_matches_text_form() {
        for text in ["0,23-31,1,-22", "0,14,1,x", "2,7,3,sl0", "1,5,1,0"] {
            let rule: MappingRule = text.parse().unwrap();
            assert_eq!(rule.to_string(), text);
        }
    }

    #[test]
    fn test_parse_rules_reports_failing_rule() {
        let err = parse_rules(["0,23-31,1,-22", "0,14,1,q"]).unwrap_err();
        match err {
            crate::error::ConfigError::InvalidRule { rule, .. } => assert_eq!(rule, "0,14,1,q"),
            other => panic!("unexpected error: {other}"),
        }
    }
}
