/// Built-in character/facial tables and their merge.
use condition_engine::catalog::{self, generate_by_kind, ConditionKind};
use condition_engine::core::pipeline::ConditionEngine;
use condition_engine::schema::axis::{AxisRegistry, MergeOrder};
use condition_engine::schema::exclusion::ExclusionTable;

#[test]
fn character_conditions_reproducible() {
    let first = generate_by_kind(ConditionKind::Character, 12345).unwrap();
    let second = generate_by_kind(ConditionKind::Character, 12345).unwrap();
    assert_eq!(first, second);
}

#[test]
fn character_conditions_vary_across_seeds() {
    let unique: std::collections::BTreeSet<String> = (0..10)
        .map(|seed| generate_by_kind(ConditionKind::Character, seed).unwrap())
        .collect();
    assert!(unique.len() > 1, "All conditions were identical");
}

#[test]
fn facial_fragment_is_single_value_when_complexion_skipped() {
    let engine = ConditionEngine::builder()
        .kind(ConditionKind::Facial)
        .optional_probability(0.0)
        .build()
        .unwrap();
    for seed in 0..50 {
        let text = engine.prompt(seed).unwrap();
        assert!(!text.is_empty());
        assert!(!text.contains(", "), "seed {} rendered '{}'", seed, text);
    }
}

#[test]
fn both_always_has_mandatory_axes_from_each_table() {
    let engine = ConditionEngine::builder().kind(ConditionKind::Both).build().unwrap();
    for seed in 0..200 {
        let set = engine.generate(seed).unwrap();
        for axis in ["physique", "wealth", "facial_signal"] {
            assert!(set.contains(axis), "seed {} missing {}", seed, axis);
        }
    }
}

#[test]
fn both_respects_cross_table_rules() {
    let engine = ConditionEngine::builder()
        .kind(ConditionKind::Both)
        .optional_probability(1.0)
        .max_optional(3)
        .build()
        .unwrap();
    let mut young = 0;
    for seed in 0..300 {
        let set = engine.generate(seed).unwrap();
        if set.get("age") == Some("young") {
            young += 1;
            assert_ne!(set.get("facial_signal"), Some("weathered"));
        }
        if set.get("wealth") == Some("decadent") {
            assert_ne!(set.get("facial_signal"), Some("gaunt"));
            assert_ne!(set.get("physique"), Some("frail"));
        }
    }
    assert!(young > 0);
}

#[test]
fn both_caps_optional_axes_per_table() {
    let engine = ConditionEngine::builder()
        .kind(ConditionKind::Both)
        .optional_probability(1.0)
        .build()
        .unwrap();
    for seed in 0..100 {
        let set = engine.generate(seed).unwrap();
        for group in [catalog::CHARACTER_GROUP, catalog::FACIAL_GROUP] {
            let optional = set
                .axes()
                .map(|axis| engine.registry().get(axis).unwrap())
                .filter(|axis| !axis.is_mandatory() && axis.group() == Some(group))
                .count();
            assert!(optional <= catalog::MAX_OPTIONAL, "seed {} group {}", seed, group);
        }
    }
}

fn complexion_count(kind: ConditionKind, probability: f64, seeds: u64) -> usize {
    let engine = ConditionEngine::builder()
        .kind(kind)
        .optional_probability(probability)
        .build()
        .unwrap();
    (0..seeds)
        .filter(|seed| engine.generate(*seed).unwrap().contains("complexion"))
        .count()
}

#[test]
fn character_optionals_do_not_crowd_out_complexion() {
    assert_eq!(complexion_count(ConditionKind::Facial, 1.0, 500), 500);
    assert_eq!(complexion_count(ConditionKind::Both, 1.0, 500), 500);

    let facial = complexion_count(ConditionKind::Facial, 0.5, 2000) as i64;
    let both = complexion_count(ConditionKind::Both, 0.5, 2000) as i64;
    assert!(
        (facial - both).abs() < 150,
        "complexion rate differs: facial {} vs both {}",
        facial,
        both
    );
}

#[test]
fn merge_keeps_each_system_independently_usable() {
    let character = catalog::character_axes().unwrap();
    let facial = catalog::facial_axes().unwrap();
    let merged = AxisRegistry::merge(&character, &facial, &MergeOrder::new()).unwrap();

    let mut expected = character.axis_names();
    expected.extend(facial.axis_names());
    assert_eq!(merged.axis_names(), expected);

    let exclusions = ExclusionTable::merge(
        &catalog::character_exclusions().unwrap(),
        &catalog::facial_exclusions().unwrap(),
        &ExclusionTable::default(),
    );
    assert!(exclusions.validate(&merged).is_ok());
    assert!(catalog::cross_exclusions().unwrap().validate(&merged).is_ok());
    // Cross rules need both systems present.
    assert!(catalog::cross_exclusions().unwrap().validate(&character).is_err());
}

#[test]
fn unknown_kind_names_rejected() {
    for name in ["", "none", "character", "FACIAL", "both", " None ", "InvalidType"] {
        assert!(name.parse::<ConditionKind>().is_err(), "'{}' parsed", name);
    }
}
