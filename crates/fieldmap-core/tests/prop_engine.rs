//! Property-based tests for the compatibility matrix, cache and validator

use fieldmap_core::{
    get_compatibility_level, CacheConfig, CompatibilityLevel, MappingError, SourceField,
    SourceFieldType, TargetField, TargetFieldType, TransformationCache, TransformationRegistry,
};
use proptest::prelude::*;
use serde_json::{json, Value};

mod test_support;
use test_support::engine;

fn source_type_strategy() -> impl Strategy<Value = SourceFieldType> {
    prop::sample::select(SourceFieldType::ALL.to_vec())
}

fn target_type_strategy() -> impl Strategy<Value = TargetFieldType> {
    prop::sample::select(TargetFieldType::ALL.to_vec())
}

/// Pairs whose level satisfies `keep`, drawn uniformly
fn pair_strategy(
    keep: impl Fn(CompatibilityLevel) -> bool,
) -> impl Strategy<Value = (SourceFieldType, TargetFieldType)> {
    let pairs: Vec<_> = SourceFieldType::ALL
        .iter()
        .flat_map(|s| TargetFieldType::ALL.iter().map(move |t| (*s, *t)))
        .filter(|(s, t)| keep(get_compatibility_level(*s, *t)))
        .collect();
    prop::sample::select(pairs)
}

fn transformation_id_strategy() -> impl Strategy<Value = Option<String>> {
    let ids: Vec<String> = TransformationRegistry::with_built_ins()
        .map(|r| r.iter().map(|t| t.id.clone()).collect())
        .unwrap_or_default();
    proptest::option::of(prop_oneof![
        prop::sample::select(ids),
        "[a-z-]{1,20}",
    ])
}

/// Values accepted by `multiSelect-to-tags`
fn multi_select_strategy() -> impl Strategy<Value = Value> {
    prop::collection::vec("[a-zA-Z0-9 ]{0,12}", 0..6)
        .prop_map(|names| Value::Array(names.into_iter().map(|n| json!({"name": n})).collect()))
}

/// Values `multiSelect-to-tags` rejects
fn non_array_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(|n| json!(n)),
        "[a-z]{0,10}".prop_map(Value::String),
        "[a-z]{1,10}".prop_map(|k| json!({ k: 1 })),
    ]
}

proptest! {
    #[test]
    fn compatibility_is_total(source in source_type_strategy(), target in target_type_strategy()) {
        let level = get_compatibility_level(source, target);
        prop_assert!(CompatibilityLevel::ALL.contains(&level));
    }

    #[test]
    fn repeated_lookup_is_a_hit(value in multi_select_strategy()) {
        let registry = TransformationRegistry::with_built_ins().unwrap();
        let t = registry.get_transformation("multiSelect-to-tags").unwrap();
        let mut cache = TransformationCache::new();

        let first = cache.get_or_compute(t, &value).unwrap();
        let second = cache.get_or_compute(t, &value).unwrap();
        prop_assert_eq!(first, second);
        prop_assert_eq!(cache.stats().hit_count, 1);
        prop_assert_eq!(cache.stats().miss_count, 1);
    }

    #[test]
    fn failures_never_poison_the_cache(value in non_array_strategy()) {
        let registry = TransformationRegistry::with_built_ins().unwrap();
        let t = registry.get_transformation("multiSelect-to-tags").unwrap();
        let mut cache = TransformationCache::new();

        prop_assert!(cache.get_or_compute(t, &value).is_err());
        prop_assert!(cache.get_or_compute(t, &value).is_err());
        prop_assert_eq!(cache.stats().miss_count, 2);
        prop_assert_eq!(cache.stats().hit_count, 0);
        prop_assert_eq!(cache.len(), 0);
    }

    #[test]
    fn capacity_is_never_exceeded(capacity in 1usize..8, inserts in 0i64..40) {
        let registry = TransformationRegistry::with_built_ins().unwrap();
        let t = registry.get_transformation("number-to-string").unwrap();
        let mut cache = TransformationCache::with_config(CacheConfig {
            max_entries: capacity,
            ..CacheConfig::default()
        });
        for n in 0..inserts {
            cache.get_or_compute(t, &json!(n)).unwrap();
            prop_assert!(cache.len() <= capacity);
        }
        let expected = (inserts as u64).saturating_sub(capacity as u64);
        prop_assert_eq!(cache.stats().evictions, expected);
    }

    #[test]
    fn direct_levels_validate_without_transformation(
        (source, target) in pair_strategy(CompatibilityLevel::is_direct),
    ) {
        let engine = engine();
        let result = engine.validate_mapping(
            &SourceField::new("s", "S", source),
            &TargetField::new("t", "T", target),
            None,
        );
        prop_assert!(result.is_valid);
    }

    #[test]
    fn none_level_always_rejects(
        (source, target) in pair_strategy(|level| level == CompatibilityLevel::None),
        id in transformation_id_strategy(),
    ) {
        let engine = engine();
        let result = engine.validate_mapping(
            &SourceField::new("s", "S", source),
            &TargetField::new("t", "T", target),
            id.as_deref(),
        );
        prop_assert!(!result.is_valid);
        let is_incompatible = matches!(result.error, Some(MappingError::IncompatibleTypes { .. }));
        prop_assert!(is_incompatible);
    }
}

#[test]
fn every_direct_pair_validates_without_transformation() {
    let engine = engine();
    let mut checked = 0;
    for source in SourceFieldType::ALL {
        for target in TargetFieldType::ALL {
            if !get_compatibility_level(source, target).is_direct() {
                continue;
            }
            let result = engine.validate_mapping(
                &SourceField::new("s", "S", source),
                &TargetField::new("t", "T", target),
                None,
            );
            assert!(result.is_valid, "{source} -> {target}");
            checked += 1;
        }
    }
    assert!(checked > 0);
}
