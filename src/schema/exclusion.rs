/// Exclusion table — committed (axis, value) pairs forbidding values on
/// other axes.
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use thiserror::Error;

use super::axis::{Axis, AxisError, AxisRegistry};
use super::condition::ConditionSet;

#[derive(Debug, Error)]
pub enum ExclusionError {
    #[error(transparent)]
    Axis(#[from] AxisError),
    #[error("exclusion rule references unknown value '{value}' on axis '{axis}'")]
    UnknownValue { axis: String, value: String },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON deserialization error: {0}")]
    Ron(#[from] ron::error::SpannedError),
}

/// Forbidden values keyed by the axis they apply to.
pub type Forbids = BTreeMap<String, BTreeSet<String>>;

/// A single rule: when `trigger` is committed, `forbids` is off-limits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExclusionRule {
    pub trigger: (String, String),
    pub forbids: Forbids,
}

impl ExclusionRule {
    pub fn when(axis: &str, value: &str) -> Self {
        Self {
            trigger: (axis.to_string(), value.to_string()),
            forbids: Forbids::new(),
        }
    }

    pub fn forbid(mut self, axis: &str, values: &[&str]) -> Self {
        self.forbids
            .entry(axis.to_string())
            .or_default()
            .extend(values.iter().map(|v| v.to_string()));
        self
    }
}

/// Read-only union of exclusion rules, indexed by trigger axis then value.
///
/// Ordered maps keep rule iteration (and therefore error reports)
/// independent of hashing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExclusionTable {
    rules: BTreeMap<String, BTreeMap<String, Forbids>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename = "Exclude")]
struct RonRule {
    when: (String, String),
    forbid: BTreeMap<String, Vec<String>>,
}

impl ExclusionTable {
    pub fn new(rules: Vec<ExclusionRule>) -> Self {
        let mut table = ExclusionTable::default();
        for rule in rules {
            table.insert(rule);
        }
        table
    }

    /// Add a rule. A trigger that already has rules gets the union of
    /// both forbidden sets.
    pub fn insert(&mut self, rule: ExclusionRule) {
        let (axis, value) = rule.trigger;
        let forbids = self.rules.entry(axis).or_default().entry(value).or_default();
        for (target, values) in rule.forbids {
            forbids.entry(target).or_default().extend(values);
        }
    }

    /// Every rule, ordered by trigger.
    pub fn rules(&self) -> Vec<ExclusionRule> {
        self.rules
            .iter()
            .flat_map(|(axis, by_value)| {
                by_value.iter().map(move |(value, forbids)| ExclusionRule {
                    trigger: (axis.clone(), value.clone()),
                    forbids: forbids.clone(),
                })
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.rules.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// What the committed pair `(axis, value)` forbids, if anything.
    pub fn forbids_of(&self, axis: &str, value: &str) -> Option<&Forbids> {
        self.rules.get(axis)?.get(value)
    }

    /// Union of the values forbidden on `target_axis` by every pair in
    /// `chosen`.
    pub fn forbidden_values_for(
        &self,
        chosen: &ConditionSet,
        target_axis: &str,
    ) -> BTreeSet<String> {
        let mut forbidden = BTreeSet::new();
        for (axis, value) in chosen.iter() {
            if let Some(values) = self
                .forbids_of(axis, value)
                .and_then(|forbids| forbids.get(target_axis))
            {
                forbidden.extend(values.iter().cloned());
            }
        }
        forbidden
    }

    /// Values of `axis` whose own rules would forbid something already in
    /// `chosen`. Committing one of them would break a rule declared from a
    /// later axis against an earlier one.
    pub fn conflicting_values_for(
        &self,
        chosen: &ConditionSet,
        axis: &Axis,
    ) -> BTreeSet<String> {
        axis.values()
            .filter(|candidate| {
                self.forbids_of(axis.name(), candidate)
                    .is_some_and(|forbids| forbids_any(forbids, chosen))
            })
            .map(str::to_string)
            .collect()
    }

    /// Forward and reverse restrictions on `axis` combined.
    pub fn blocked_values_for(
        &self,
        chosen: &ConditionSet,
        axis: &Axis,
    ) -> BTreeSet<String> {
        let mut blocked = self.forbidden_values_for(chosen, axis.name());
        blocked.extend(self.conflicting_values_for(chosen, axis));
        blocked
    }

    /// Chosen pairs that restrict `axis`, in `chosen` order.
    pub fn triggers_for(&self, chosen: &ConditionSet, axis: &Axis) -> Vec<(String, String)> {
        chosen
            .iter()
            .filter(|(trigger_axis, trigger_value)| {
                let forward = self
                    .forbids_of(trigger_axis, trigger_value)
                    .and_then(|forbids| forbids.get(axis.name()))
                    .is_some_and(|values| !values.is_empty());
                let reverse = axis.values().any(|candidate| {
                    self.forbids_of(axis.name(), candidate)
                        .and_then(|forbids| forbids.get(*trigger_axis))
                        .is_some_and(|values| values.contains(*trigger_value))
                });
                forward || reverse
            })
            .map(|(a, v)| (a.to_string(), v.to_string()))
            .collect()
    }

    /// Compose two tables plus extra cross-table rules. Forbidden sets for
    /// a shared trigger are unioned.
    pub fn merge(
        first: &ExclusionTable,
        second: &ExclusionTable,
        extra: &ExclusionTable,
    ) -> ExclusionTable {
        let mut merged = first.clone();
        for rule in second.rules().into_iter().chain(extra.rules()) {
            merged.insert(rule);
        }
        merged
    }

    /// Check every trigger and target against `registry`.
    pub fn validate(&self, registry: &AxisRegistry) -> Result<(), ExclusionError> {
        for rule in self.rules() {
            let (axis, value) = &rule.trigger;
            check_value(registry.get(axis)?, value)?;
            for (target, values) in &rule.forbids {
                let target = registry.get(target)?;
                for value in values {
                    check_value(target, value)?;
                }
            }
        }
        Ok(())
    }

    /// Load a table from a RON file.
    pub fn load_from_ron(path: &Path) -> Result<ExclusionTable, ExclusionError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse_ron(&contents)
    }

    /// Parse a table from a RON list of `Exclude(...)` entries.
    pub fn parse_ron(input: &str) -> Result<ExclusionTable, ExclusionError> {
        let raw: Vec<RonRule> = ron::from_str(input)?;
        let rules = raw
            .into_iter()
            .map(|ron_rule| ExclusionRule {
                trigger: ron_rule.when,
                forbids: ron_rule
                    .forbid
                    .into_iter()
                    .map(|(axis, values)| (axis, values.into_iter().collect()))
                    .collect(),
            })
            .collect();
        Ok(Self::new(rules))
    }
}

fn forbids_any(forbids: &Forbids, chosen: &ConditionSet) -> bool {
    forbids.iter().any(|(axis, values)| {
        chosen
            .get(axis)
            .is_some_and(|committed| values.contains(committed))
    })
}

fn check_value(axis: &Axis, value: &str) -> Result<(), ExclusionError> {
    if axis.contains(value) {
        Ok(())
    } else {
        Err(ExclusionError::UnknownValue {
            axis: axis.name().to_string(),
            value: value.to_string(),
        })
    }
}
