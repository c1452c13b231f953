/// Axis registry — named categorical attributes with weighted domains.
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AxisError {
    #[error("unknown axis: {0}")]
    UnknownAxis(String),
    #[error("duplicate axis: {0}")]
    DuplicateAxis(String),
    #[error("axis '{0}' has an empty domain")]
    EmptyDomain(String),
    #[error("axis '{axis}' declares value '{value}' more than once")]
    DuplicateValue { axis: String, value: String },
    #[error("axis '{axis}' value '{value}' has invalid weight {weight}")]
    InvalidWeight {
        axis: String,
        value: String,
        weight: f64,
    },
    #[error("axis '{axis}' weights value '{value}' which is not in its domain")]
    UndeclaredWeight { axis: String, value: String },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON deserialization error: {0}")]
    Ron(#[from] ron::error::SpannedError),
}

/// One option of an axis domain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightedValue {
    pub value: String,
    pub weight: f64,
}

/// A named categorical attribute. The domain order is significant: it is
/// the tie-break order for sampling.
///
/// `group` names the table an axis came from. Optional-axis caps are
/// counted per group, so merged tables keep their own budgets.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Axis {
    name: String,
    domain: Vec<WeightedValue>,
    mandatory: bool,
    group: Option<String>,
}

impl Axis {
    /// Build an axis, rejecting empty domains, duplicate values and
    /// weights that are not finite and positive.
    pub fn new(
        name: impl Into<String>,
        domain: Vec<WeightedValue>,
        mandatory: bool,
    ) -> Result<Axis, AxisError> {
        let name = name.into();
        if domain.is_empty() {
            return Err(AxisError::EmptyDomain(name));
        }

        let mut seen = FxHashSet::default();
        for option in &domain {
            if !option.weight.is_finite() || option.weight <= 0.0 {
                return Err(AxisError::InvalidWeight {
                    axis: name,
                    value: option.value.clone(),
                    weight: option.weight,
                });
            }
            if !seen.insert(option.value.as_str()) {
                return Err(AxisError::DuplicateValue {
                    axis: name,
                    value: option.value.clone(),
                });
            }
        }

        Ok(Axis {
            name,
            domain,
            mandatory,
            group: None,
        })
    }

    pub fn in_group(mut self, group: &str) -> Axis {
        self.group = Some(group.to_string());
        self
    }

    /// Shorthand for a uniform domain.
    pub fn uniform(name: &str, values: &[&str], mandatory: bool) -> Result<Axis, AxisError> {
        Self::weighted(
            name,
            &values.iter().map(|v| (*v, 1.0)).collect::<Vec<_>>(),
            mandatory,
        )
    }

    /// Shorthand for a domain given as `(value, weight)` pairs.
    pub fn weighted(
        name: &str,
        values: &[(&str, f64)],
        mandatory: bool,
    ) -> Result<Axis, AxisError> {
        let domain = values
            .iter()
            .map(|(value, weight)| WeightedValue {
                value: value.to_string(),
                weight: *weight,
            })
            .collect();
        Self::new(name, domain, mandatory)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn domain(&self) -> &[WeightedValue] {
        &self.domain
    }

    pub fn is_mandatory(&self) -> bool {
        self.mandatory
    }

    pub fn group(&self) -> Option<&str> {
        self.group.as_deref()
    }

    pub fn contains(&self, value: &str) -> bool {
        self.domain.iter().any(|option| option.value == value)
    }

    /// Domain values in declaration order.
    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.domain.iter().map(|option| option.value.as_str())
    }
}

/// Where a merge moves an axis relative to the concatenated order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Placement {
    First,
    Last,
    Before(String),
    After(String),
}

/// Explicit merge-time reordering. Placements are applied in sequence
/// to the concatenated order; an empty list keeps the concatenation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeOrder {
    pub placements: Vec<(String, Placement)>,
}

impl MergeOrder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn place(mut self, axis: &str, placement: Placement) -> Self {
        self.placements.push((axis.to_string(), placement));
        self
    }
}

/// Ordered, read-only set of axes. Insertion order is the canonical
/// evaluation order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AxisRegistry {
    axes: Vec<Axis>,
}

// RON deserialization helpers. Weights are keyed by value and default to
// 1.0, so uniform axes only list their values.

#[derive(Debug, Deserialize)]
#[serde(rename = "Axis")]
struct RonAxis {
    name: String,
    #[serde(default)]
    mandatory: bool,
    values: Vec<String>,
    #[serde(default)]
    weights: HashMap<String, f64>,
    #[serde(default)]
    group: Option<String>,
}

impl AxisRegistry {
    pub fn new(axes: Vec<Axis>) -> Result<AxisRegistry, AxisError> {
        let mut registry = AxisRegistry::default();
        for axis in axes {
            registry.push(axis)?;
        }
        Ok(registry)
    }

    /// Append an axis at the end of the canonical order.
    pub fn push(&mut self, axis: Axis) -> Result<(), AxisError> {
        if self.position(axis.name()).is_some() {
            return Err(AxisError::DuplicateAxis(axis.name));
        }
        self.axes.push(axis);
        Ok(())
    }

    /// Axes in canonical evaluation order.
    pub fn get_axes(&self) -> &[Axis] {
        &self.axes
    }

    pub fn get(&self, name: &str) -> Result<&Axis, AxisError> {
        self.axes
            .iter()
            .find(|axis| axis.name == name)
            .ok_or_else(|| AxisError::UnknownAxis(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    pub fn axis_names(&self) -> Vec<&str> {
        self.axes.iter().map(Axis::name).collect()
    }

    pub fn axis_values(&self, name: &str) -> Result<Vec<&str>, AxisError> {
        Ok(self.get(name)?.values().collect())
    }

    pub fn len(&self) -> usize {
        self.axes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.axes.is_empty()
    }

    /// Assign every axis that has no group yet to `group`.
    pub fn with_group(mut self, group: &str) -> AxisRegistry {
        for axis in self.axes.iter_mut().filter(|axis| axis.group.is_none()) {
            axis.group = Some(group.to_string());
        }
        self
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.axes.iter().position(|axis| axis.name == name)
    }

    /// Compose two registries: all of `first`, then all of `second`, then
    /// the placements of `order` applied one after another.
    pub fn merge(
        first: &AxisRegistry,
        second: &AxisRegistry,
        order: &MergeOrder,
    ) -> Result<AxisRegistry, AxisError> {
        let mut merged = first.clone();
        for axis in &second.axes {
            merged.push(axis.clone())?;
        }

        for (name, placement) in &order.placements {
            let from = merged
                .position(name)
                .ok_or_else(|| AxisError::UnknownAxis(name.clone()))?;
            let axis = merged.axes.remove(from);

            let to = match placement {
                Placement::First => 0,
                Placement::Last => merged.axes.len(),
                Placement::Before(anchor) => merged
                    .position(anchor)
                    .ok_or_else(|| AxisError::UnknownAxis(anchor.clone()))?,
                Placement::After(anchor) => {
                    merged
                        .position(anchor)
                        .ok_or_else(|| AxisError::UnknownAxis(anchor.clone()))?
                        + 1
                }
            };
            merged.axes.insert(to, axis);
        }

        Ok(merged)
    }

    /// Load a registry from a RON file.
    pub fn load_from_ron(path: &Path) -> Result<AxisRegistry, AxisError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse_ron(&contents)
    }

    /// Parse a registry from a RON list of `Axis(...)` entries.
    pub fn parse_ron(input: &str) -> Result<AxisRegistry, AxisError> {
        let raw: Vec<RonAxis> = ron::from_str(input)?;
        let mut registry = AxisRegistry::default();

        for ron_axis in raw {
            for weighted in ron_axis.weights.keys() {
                if !ron_axis.values.contains(weighted) {
                    return Err(AxisError::UndeclaredWeight {
                        axis: ron_axis.name.clone(),
                        value: weighted.clone(),
                    });
                }
            }

            let domain = ron_axis
                .values
                .iter()
                .map(|value| WeightedValue {
                    value: value.clone(),
                    weight: ron_axis.weights.get(value).copied().unwrap_or(1.0),
                })
                .collect();
            let mut axis = Axis::new(ron_axis.name, domain, ron_axis.mandatory)?;
            axis.group = ron_axis.group;
            registry.push(axis)?;
        }

        Ok(registry)
    }
}
