//! Configuration file for the converter
//!
//! Rules can be written in the same text form the command line accepts, or
//! as explicit `[[buttons]]` / `[[axes]]` tables that name their kind instead
//! of relying on whether the last field parses as a number.

use midi2joy_core::{
    parse_rules, AxisId, AxisRule, ButtonRule, ConfigError, IdentifierRange, MappingRule,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Range of identifiers mapped to consecutive buttons
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ButtonTable {
    pub channel: i32,
    /// First identifier (inclusive)
    pub first: i32,
    /// Last identifier (inclusive, defaults to `first`)
    pub last: Option<i32>,
    pub device: u32,
    /// Added to each identifier to get the button index
    #[serde(default)]
    pub offset: i32,
}

/// Single identifier mapped to an axis
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AxisTable {
    pub channel: i32,
    pub identifier: i32,
    pub device: u32,
    pub axis: AxisId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Name prefix for the virtual joysticks
    #[serde(default = "default_device_name")]
    pub device_name: String,
    /// Substring filters for MIDI input port names; empty opens every port
    #[serde(default)]
    pub ports: Vec<String>,
    /// Rules in command-line text form
    #[serde(default)]
    pub rules: Vec<String>,
    #[serde(default)]
    pub buttons: Vec<ButtonTable>,
    #[serde(default)]
    pub axes: Vec<AxisTable>,
}

fn default_device_name() -> String {
    "midi2joy".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            device_name: default_device_name(),
            ports: Vec::new(),
            rules: Vec::new(),
            buttons: Vec::new(),
            axes: Vec::new(),
        }
    }
}

impl Config {
    /// Get the default config file path
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("midi2joy")
            .join("config.toml")
    }

    /// Load config from a file, or return default if not found
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Config = toml::from_str(&content)
                .map_err(|e| anyhow::anyhow!("{}: {}", path.display(), e))?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// All rules from this file followed by `extra` (command-line) rules
    pub fn mapping_rules(&self, extra: &[String]) -> Result<Vec<MappingRule>, ConfigError> {
        let mut rules = parse_rules(&self.rules)?;

        for button in &self.buttons {
            rules.push(button.to_rule()?);
        }
        rules.extend(self.axes.iter().map(AxisTable::to_rule));
        rules.extend(parse_rules(extra)?);

        if rules.is_empty() {
            return Err(ConfigError::NoRules);
        }
        Ok(rules)
    }
}

impl ButtonTable {
    fn to_rule(&self) -> Result<MappingRule, ConfigError> {
        let last = self.last.unwrap_or(self.first);
        let identifiers =
            IdentifierRange::new(self.first, last).map_err(|source| ConfigError::InvalidRule {
                rule: self.describe(),
                source,
            })?;
        Ok(MappingRule::Button(ButtonRule {
            channel: self.channel,
            identifiers,
            device_id: self.device,
            button_offset: self.offset,
        }))
    }

    fn describe(&self) -> String {
        format!(
            "[[buttons]] channel = {}, first = {}, last = {}, device = {}, offset = {}",
            self.channel,
            self.first,
            self.last.unwrap_or(self.first),
            self.device,
            self.offset
        )
    }
}

impl AxisTable {
    fn to_rule(&self) -> MappingRule {
        MappingRule::Axis(AxisRule {
            channel: self.channel,
            identifier: self.identifier,
            device_id: self.device,
            axis: self.axis,
        })
    }
}
