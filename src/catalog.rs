//! Built-in character and facial condition tables.
//!
//! The tables are embedded at compile time. Character and facial tables
//! stay independently usable; `ConditionKind::Both` merges them (character
//! axes first) together with the cross-table rules.

use std::fmt;
use std::str::FromStr;

use crate::core::pipeline::{ConditionEngine, EngineError};
use crate::schema::axis::{AxisRegistry, MergeOrder};
use crate::schema::exclusion::ExclusionTable;

mod data {
    pub const CHARACTER_AXES: &str = include_str!("../tables/character_axes.ron");
    pub const CHARACTER_EXCLUSIONS: &str = include_str!("../tables/character_exclusions.ron");
    pub const FACIAL_AXES: &str = include_str!("../tables/facial_axes.ron");
    pub const FACIAL_EXCLUSIONS: &str = include_str!("../tables/facial_exclusions.ron");
    pub const CROSS_EXCLUSIONS: &str = include_str!("../tables/cross_exclusions.ron");
}

/// At most this many optional axes of each table are included per
/// generated set.
pub const MAX_OPTIONAL: usize = 2;

pub const CHARACTER_GROUP: &str = "character";
pub const FACIAL_GROUP: &str = "facial";

/// Which condition system to draw from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConditionKind {
    None,
    Character,
    Facial,
    Both,
}

impl ConditionKind {
    pub const ALL: [ConditionKind; 4] = [
        ConditionKind::None,
        ConditionKind::Character,
        ConditionKind::Facial,
        ConditionKind::Both,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::None => "None",
            Self::Character => "Character",
            Self::Facial => "Facial",
            Self::Both => "Both",
        }
    }
}

impl fmt::Display for ConditionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("unknown condition kind: '{0}'")]
pub struct UnknownKind(pub String);

impl FromStr for ConditionKind {
    type Err = UnknownKind;

    /// Names are matched exactly: `"None"`, `"Character"`, `"Facial"`, `"Both"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| UnknownKind(s.to_string()))
    }
}

pub fn character_axes() -> Result<AxisRegistry, EngineError> {
    Ok(AxisRegistry::parse_ron(data::CHARACTER_AXES)?.with_group(CHARACTER_GROUP))
}

pub fn character_exclusions() -> Result<ExclusionTable, EngineError> {
    Ok(ExclusionTable::parse_ron(data::CHARACTER_EXCLUSIONS)?)
}

pub fn facial_axes() -> Result<AxisRegistry, EngineError> {
    Ok(AxisRegistry::parse_ron(data::FACIAL_AXES)?.with_group(FACIAL_GROUP))
}

pub fn facial_exclusions() -> Result<ExclusionTable, EngineError> {
    Ok(ExclusionTable::parse_ron(data::FACIAL_EXCLUSIONS)?)
}

pub fn cross_exclusions() -> Result<ExclusionTable, EngineError> {
    Ok(ExclusionTable::parse_ron(data::CROSS_EXCLUSIONS)?)
}

/// Axes and exclusions for `kind`. `None` yields empty tables.
pub fn tables(kind: ConditionKind) -> Result<(AxisRegistry, ExclusionTable), EngineError> {
    match kind {
        ConditionKind::None => Ok((AxisRegistry::default(), ExclusionTable::default())),
        ConditionKind::Character => Ok((character_axes()?, character_exclusions()?)),
        ConditionKind::Facial => Ok((facial_axes()?, facial_exclusions()?)),
        ConditionKind::Both => {
            let axes =
                AxisRegistry::merge(&character_axes()?, &facial_axes()?, &MergeOrder::new())?;
            let exclusions = ExclusionTable::merge(
                &character_exclusions()?,
                &facial_exclusions()?,
                &cross_exclusions()?,
            );
            Ok((axes, exclusions))
        }
    }
}

/// Generate and render a prompt fragment for `kind` with the built-in
/// tables and default options.
pub fn generate_by_kind(kind: ConditionKind, seed: u64) -> Result<String, EngineError> {
    let engine = ConditionEngine::builder().kind(kind).build()?;
    engine.prompt(seed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_parses_exact_names() {
        assert_eq!("Both".parse::<ConditionKind>(), Ok(ConditionKind::Both));
        assert_eq!("None".parse::<ConditionKind>(), Ok(ConditionKind::None));
        assert!("both".parse::<ConditionKind>().is_err());
        assert!(" None ".parse::<ConditionKind>().is_err());
        assert!("".parse::<ConditionKind>().is_err());
    }

    #[test]
    fn kind_display_round_trips() {
        for kind in ConditionKind::ALL {
            assert_eq!(kind.to_string().parse::<ConditionKind>(), Ok(kind));
        }
    }

    #[test]
    fn character_tables_load() {
        let axes = character_axes().unwrap();
        assert_eq!(
            axes.axis_names(),
            vec!["physique", "wealth", "health", "demeanor", "age"]
        );
        assert!(axes.get("physique").unwrap().is_mandatory());
        assert!(axes.get("wealth").unwrap().is_mandatory());
        assert!(!axes.get("age").unwrap().is_mandatory());
        assert!(character_exclusions().unwrap().validate(&axes).is_ok());
    }

    #[test]
    fn facial_tables_load() {
        let axes = facial_axes().unwrap();
        assert_eq!(axes.axis_names(), vec!["facial_signal", "complexion"]);
        assert!(axes.get("facial_signal").unwrap().is_mandatory());
        assert!(facial_exclusions().unwrap().validate(&axes).is_ok());
    }

    #[test]
    fn merged_tables_validate() {
        let (axes, exclusions) = tables(ConditionKind::Both).unwrap();
        assert_eq!(axes.len(), 7);
        assert_eq!(axes.get_axes()[5].name(), "facial_signal");
        assert!(exclusions.validate(&axes).is_ok());
        // Cross rules and both source tables survive the merge.
        assert!(exclusions.forbids_of("age", "young").is_some());
        assert!(exclusions.forbids_of("health", "hale").unwrap().contains_key("physique"));
        assert!(exclusions.forbids_of("health", "hale").unwrap().contains_key("complexion"));
        assert!(exclusions.forbids_of("facial_signal", "gaunt").is_some());
        assert_eq!(axes.get("health").unwrap().group(), Some(CHARACTER_GROUP));
        assert_eq!(axes.get("complexion").unwrap().group(), Some(FACIAL_GROUP));
    }

    #[test]
    fn none_kind_renders_empty() {
        assert_eq!(generate_by_kind(ConditionKind::None, 42).unwrap(), "");
    }

    #[test]
    fn facial_never_empty() {
        for seed in 0..100 {
            let text = generate_by_kind(ConditionKind::Facial, seed).unwrap();
            assert!(!text.is_empty(), "empty facial fragment for seed {}", seed);
        }
    }

    #[test]
    fn character_has_both_mandatory_values() {
        for seed in 0..50 {
            let text = generate_by_kind(ConditionKind::Character, seed).unwrap();
            assert!(text.contains(", "), "seed {} rendered '{}'", seed, text);
        }
    }

    #[test]
    fn both_is_reproducible() {
        for seed in [0, 42, 12345] {
            assert_eq!(
                generate_by_kind(ConditionKind::Both, seed).unwrap(),
                generate_by_kind(ConditionKind::Both, seed).unwrap()
            );
        }
    }
}
