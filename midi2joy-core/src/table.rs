//! Mapping table: `(channel, identifier)` → output target
//!
//! Built once from the configured rules, then shared read-only (usually behind
//! an `Arc`) with the router.

use crate::axis::AxisId;
use crate::error::{ConfigError, MappingError};
use crate::rule::MappingRule;
use crate::target::{MappingKey, OutputTarget};
use std::collections::{BTreeSet, HashMap};
use std::num::NonZeroU32;
use tracing::info;

#[derive(Debug, Default, Clone)]
pub struct MappingTable {
    targets: HashMap<MappingKey, OutputTarget>,
    device_ids: BTreeSet<u32>,
}

impl MappingTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from a complete rule set.
    ///
    /// Any rejected rule aborts construction; the error names the rule.
    pub fn from_rules(rules: &[MappingRule]) -> Result<Self, ConfigError> {
        if rules.is_empty() {
            return Err(ConfigError::NoRules);
        }

        let mut table = Self::new();
        for rule in rules {
            table
                .apply_rule(rule)
                .map_err(|source| ConfigError::RuleRejected {
                    rule: rule.to_string(),
                    source,
                })?;
        }
        Ok(table)
    }

    /// Map a 1-based button. Fails if the key is already bound or `button_index` is 0.
    pub fn add_button_mapping(
        &mut self,
        channel: i32,
        identifier: i32,
        device_id: u32,
        button_index: u32,
    ) -> Result<(), MappingError> {
        let key = MappingKey::new(channel, identifier);
        let button = NonZeroU32::new(button_index).ok_or(MappingError::InvalidButtonIndex {
            key,
            index: 0,
        })?;
        self.insert(key, OutputTarget::Button { device_id, button })
    }

    /// Map an axis. Fails if the key is already bound.
    pub fn add_axis_mapping(
        &mut self,
        channel: i32,
        identifier: i32,
        device_id: u32,
        axis: AxisId,
    ) -> Result<(), MappingError> {
        let key = MappingKey::new(channel, identifier);
        self.insert(key, OutputTarget::Axis { device_id, axis })
    }

    /// Expand one rule into the table.
    ///
    /// All entries of the rule are validated first, so a rejected rule leaves
    /// the table as it was.
    pub fn apply_rule(&mut self, rule: &MappingRule) -> Result<(), MappingError> {
        let entries = expand_rule(rule)?;

        for (key, _) in &entries {
            if let Some(existing) = self.targets.get(key) {
                return Err(MappingError::DuplicateKey {
                    key: *key,
                    existing: *existing,
                });
            }
        }

        for (key, target) in entries {
            info!("Mapping: MIDI {} to {}", key, target);
            self.insert(key, target)?;
        }
        Ok(())
    }

    /// Look up the target for an input event, if any
    pub fn resolve(&self, channel: i32, identifier: i32) -> Option<OutputTarget> {
        self.targets
            .get(&MappingKey::new(channel, identifier))
            .copied()
    }

    /// Distinct device ids referenced by any target, ascending
    pub fn device_ids(&self) -> &BTreeSet<u32> {
        &self.device_ids
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// All entries sorted by key
    pub fn iter(&self) -> impl Iterator<Item = (MappingKey, OutputTarget)> + '_ {
        let mut entries: Vec<_> = self.targets.iter().map(|(k, t)| (*k, *t)).collect();
        entries.sort_by_key(|(key, _)| *key);
        entries.into_iter()
    }

    fn insert(&mut self, key: MappingKey, target: OutputTarget) -> Result<(), MappingError> {
        if let Some(existing) = self.targets.get(&key) {
            return Err(MappingError::DuplicateKey {
                key,
                existing: *existing,
            });
        }
        self.device_ids.insert(target.device_id());
        self.targets.insert(key, target);
        Ok(())
    }
}

/// Entries a rule contributes, or the reason it is invalid
fn expand_rule(rule: &MappingRule) -> Result<Vec<(MappingKey, OutputTarget)>, MappingError> {
    match rule {
        MappingRule::Button(rule) => {
            rule.identifiers
                .iter()
                .map(|identifier| -> Result<_, MappingError> {
                    let key = MappingKey::new(rule.channel, identifier);
                    let index = identifier as i64 + rule.button_offset as i64;
                    let button = u32::try_from(index)
                        .ok()
                        .and_then(NonZeroU32::new)
                        .ok_or(MappingError::InvalidButtonIndex { key, index })?;
                    Ok((
                        key,
                        OutputTarget::Button {
                            device_id: rule.device_id,
                            button,
                        },
                    ))
                })
                .collect()
        }
        MappingRule::Axis(rule) => Ok(vec![(
            MappingKey::new(rule.channel, rule.identifier),
            OutputTarget::Axis {
                device_id: rule.device_id,
                axis: rule.axis,
            },
        )]),
    }
}
