/// Property checks: determinism, exclusion enforcement, mandatory coverage.
use condition_engine::catalog::ConditionKind;
use condition_engine::core::pipeline::ConditionEngine;
use condition_engine::core::render::render_canonical;
use proptest::prelude::*;

fn both_engine(probability: f64) -> ConditionEngine {
    ConditionEngine::builder()
        .kind(ConditionKind::Both)
        .optional_probability(probability)
        .max_optional(5)
        .build()
        .unwrap()
}

proptest! {
    #[test]
    fn same_seed_same_conditions(seed in any::<u64>(), probability in 0.0f64..=1.0) {
        let engine = both_engine(probability);
        let first = engine.generate(seed).unwrap();
        let second = engine.generate(seed).unwrap();
        prop_assert_eq!(&first, &second);
        prop_assert_eq!(engine.render(&first), render_canonical(&second, engine.registry()));
    }

    #[test]
    fn no_chosen_pair_forbids_another(seed in any::<u64>(), probability in 0.0f64..=1.0) {
        let engine = both_engine(probability);
        let set = engine.generate(seed).unwrap();
        for (axis, value) in set.iter() {
            if let Some(forbids) = engine.exclusions().forbids_of(axis, value) {
                for (target, values) in forbids {
                    if let Some(committed) = set.get(target) {
                        prop_assert!(
                            !values.contains(committed),
                            "{}={} forbids {}={}", axis, value, target, committed
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn mandatory_axes_always_present(seed in any::<u64>()) {
        let engine = both_engine(0.5);
        let set = engine.generate(seed).unwrap();
        for axis in engine.registry().get_axes() {
            if axis.is_mandatory() {
                prop_assert!(set.contains(axis.name()));
            }
        }
    }

    #[test]
    fn probability_zero_only_mandatory(seed in any::<u64>()) {
        let engine = both_engine(0.0);
        let set = engine.generate(seed).unwrap();
        for axis in set.axes() {
            prop_assert!(engine.registry().get(axis).unwrap().is_mandatory());
        }
    }

    #[test]
    fn values_come_from_their_domains(seed in any::<u64>()) {
        let engine = both_engine(1.0);
        let set = engine.generate(seed).unwrap();
        for (axis, value) in set.iter() {
            prop_assert!(engine.registry().get(axis).unwrap().contains(value));
        }
    }
}
