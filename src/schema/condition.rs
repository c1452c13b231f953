use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::axis::AxisError;

/// Resolved axis → value mapping for one generation run, in the order the
/// values were committed. Skipped optional axes are simply absent.
///
/// Serialized as a list of `(axis, value)` pairs; deserializing a list
/// that names an axis twice fails.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<(String, String)>", into = "Vec<(String, String)>")]
pub struct ConditionSet {
    entries: Vec<(String, String)>,
}

impl ConditionSet {
    /// Build a set from `(axis, value)` pairs, keeping their order. Each
    /// axis may appear once.
    pub fn from_pairs<A, V>(pairs: impl IntoIterator<Item = (A, V)>) -> Result<Self, AxisError>
    where
        A: Into<String>,
        V: Into<String>,
    {
        let mut set = ConditionSet::default();
        for (axis, value) in pairs {
            let axis = axis.into();
            if set.contains(&axis) {
                return Err(AxisError::DuplicateAxis(axis));
            }
            set.entries.push((axis, value.into()));
        }
        Ok(set)
    }

    /// Record a value, replacing any earlier value for the same axis.
    pub(crate) fn insert(&mut self, axis: &str, value: &str) {
        match self.entries.iter_mut().find(|(name, _)| name == axis) {
            Some(entry) => entry.1 = value.to_string(),
            None => self.entries.push((axis.to_string(), value.to_string())),
        }
    }

    pub fn get(&self, axis: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(name, _)| name == axis)
            .map(|(_, value)| value.as_str())
    }

    pub fn contains(&self, axis: &str) -> bool {
        self.get(axis).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(axis, value)| (axis.as_str(), value.as_str()))
    }

    pub fn axes(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(axis, _)| axis.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl TryFrom<Vec<(String, String)>> for ConditionSet {
    type Error = AxisError;

    fn try_from(pairs: Vec<(String, String)>) -> Result<Self, Self::Error> {
        Self::from_pairs(pairs)
    }
}

impl From<ConditionSet> for Vec<(String, String)> {
    fn from(set: ConditionSet) -> Self {
        set.entries
    }
}

/// Caller-pinned values. Pinned axes skip sampling entirely.
pub type Overrides = BTreeMap<String, String>;
