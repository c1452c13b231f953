/// Prompt renderer — condition set to a comma-separated prompt fragment.
use thiserror::Error;

use crate::schema::axis::AxisRegistry;
use crate::schema::condition::ConditionSet;

pub const SEPARATOR: &str = ", ";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RenderError {
    #[error("unknown axis in render order: {0}")]
    UnknownAxis(String),
}

/// Join the values of `set` for each axis of `axes_order` that is present.
///
/// Every name in `axes_order` must be registered in `known`; absent
/// optional axes contribute nothing.
pub fn render(
    set: &ConditionSet,
    axes_order: &[&str],
    known: &AxisRegistry,
) -> Result<String, RenderError> {
    let mut parts = Vec::with_capacity(set.len());
    for axis in axes_order {
        if !known.contains(axis) {
            return Err(RenderError::UnknownAxis(axis.to_string()));
        }
        if let Some(value) = set.get(axis) {
            parts.push(value);
        }
    }
    Ok(parts.join(SEPARATOR))
}

/// Render in the registry's canonical order.
pub fn render_canonical(set: &ConditionSet, registry: &AxisRegistry) -> String {
    registry
        .get_axes()
        .iter()
        .filter_map(|axis| set.get(axis.name()))
        .collect::<Vec<_>>()
        .join(SEPARATOR)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::axis::Axis;

    fn registry() -> AxisRegistry {
        AxisRegistry::new(vec![
            Axis::uniform("physique", &["wiry"], true).unwrap(),
            Axis::uniform("wealth", &["poor"], true).unwrap(),
            Axis::uniform("age", &["old"], false).unwrap(),
        ])
        .unwrap()
    }

    fn set(pairs: &[(&str, &str)]) -> ConditionSet {
        let mut set = ConditionSet::default();
        for (axis, value) in pairs {
            set.insert(axis, value);
        }
        set
    }

    #[test]
    fn render_joins_in_requested_order() {
        let cs = set(&[("physique", "wiry"), ("wealth", "poor"), ("age", "old")]);
        let text = render(&cs, &["age", "physique", "wealth"], &registry()).unwrap();
        assert_eq!(text, "old, wiry, poor");
    }

    #[test]
    fn render_skips_missing_axes() {
        let cs = set(&[("physique", "wiry"), ("wealth", "poor")]);
        let text = render(&cs, &["physique", "age", "wealth"], &registry()).unwrap();
        assert_eq!(text, "wiry, poor");
    }

    #[test]
    fn render_empty_set() {
        let text = render(&ConditionSet::default(), &["physique", "age"], &registry()).unwrap();
        assert_eq!(text, "");
        assert_eq!(render_canonical(&ConditionSet::default(), &registry()), "");
    }

    #[test]
    fn render_unknown_axis() {
        let cs = set(&[("physique", "wiry")]);
        assert_eq!(
            render(&cs, &["physique", "nose"], &registry()),
            Err(RenderError::UnknownAxis("nose".to_string()))
        );
    }

    #[test]
    fn render_is_pure() {
        let cs = set(&[("wealth", "poor"), ("physique", "wiry")]);
        let first = render_canonical(&cs, &registry());
        let second = render_canonical(&cs, &registry());
        assert_eq!(first, second);
        assert_eq!(first, "wiry, poor");
    }
}
