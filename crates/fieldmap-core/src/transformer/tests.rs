//! Tests for the transformation catalog
//!
//! Copyright (c) 2025 Fieldmap Team
//! Licensed under the Apache-2.0 license

#[cfg(test)]
mod tests {
    use super::super::{built_in, Transformation, TransformationRegistry, ValueError};
    use crate::compatibility::get_compatibility_level;
    use crate::types::{CompatibilityLevel, SourceFieldType, TargetFieldType};
    use crate::Error;
    use serde_json::{json, Value};

    fn registry() -> TransformationRegistry {
        TransformationRegistry::with_built_ins().unwrap()
    }

    fn apply(id: &str, value: Value) -> Value {
        registry().get_transformation(id).unwrap().apply(&value).unwrap()
    }

    #[test]
    fn test_built_in_examples_hold() {
        let registry = registry();
        assert_eq!(registry.len(), built_in::catalog().len());
        for t in registry.iter() {
            let example = t.example.as_ref().unwrap();
            let actual = t.apply(&example.source).unwrap();
            assert_eq!(actual, example.target, "example of {}", t.id);
        }
    }

    #[test]
    fn test_every_transforming_pair_has_a_transformation() {
        let registry = registry();
        for source in SourceFieldType::ALL {
            for target in TargetFieldType::ALL {
                if get_compatibility_level(source, target).requires_transformation() {
                    assert!(
                        !registry.find_transformations(source, target).is_empty(),
                        "no transformation for {source} -> {target}"
                    );
                }
            }
        }
    }

    #[test]
    fn test_no_transformation_targets_an_incompatible_pair() {
        for t in registry().iter() {
            assert_ne!(
                get_compatibility_level(t.source_type, t.target_type),
                CompatibilityLevel::None,
                "{} declares an incompatible pair",
                t.id
            );
        }
    }

    #[test]
    fn test_find_keeps_declaration_order() {
        let registry = registry();
        let ids: Vec<_> = registry
            .find_transformations(SourceFieldType::RichText, TargetFieldType::String)
            .into_iter()
            .map(|t| t.id.as_str())
            .collect();
        assert_eq!(ids, vec!["richText-to-plain", "richText-to-excerpt"]);
        assert!(registry
            .find_transformations(SourceFieldType::Files, TargetFieldType::Boolean)
            .is_empty());
    }

    #[test]
    fn test_rich_text_to_plain_concatenates_blocks() {
        let value = json!([{"plain_text": "Hello "}, {"plain_text": "World"}]);
        assert_eq!(apply("richText-to-plain", value), json!("Hello World"));
    }

    #[test]
    fn test_multi_select_to_tags_rejects_non_array() {
        let registry = registry();
        let t = registry.get_transformation("multiSelect-to-tags").unwrap();
        let err = t.apply(&json!("rust")).unwrap_err();
        assert_eq!(err.transformation_id, "multiSelect-to-tags");
        assert_eq!(
            err.reason,
            ValueError::UnexpectedShape {
                expected: "array",
                found: "string"
            }
        );
    }

    #[test]
    fn test_empty_arrays_never_become_null() {
        let registry = registry();
        for t in registry.iter() {
            let Ok(out) = t.apply(&json!([])) else {
                continue;
            };
            assert!(!out.is_null(), "{} turned [] into null", t.id);
            assert!(
                out == json!([]) || out == json!(""),
                "{} turned [] into {}",
                t.id,
                out
            );
        }
    }

    #[test]
    fn test_null_short_circuits() {
        for t in registry().iter() {
            assert_eq!(t.apply(&Value::Null).unwrap(), Value::Null);
        }
    }

    #[test]
    fn test_excerpt_cuts_at_word_boundary() {
        let long = "word ".repeat(60);
        let out = apply("richText-to-excerpt", json!([{ "plain_text": long }]));
        let text = out.as_str().unwrap();
        assert!(text.ends_with("word..."));
        assert!(text.chars().count() <= built_in::EXCERPT_LENGTH + 3);
    }

    #[test]
    fn test_date_to_text_formats_ranges() {
        assert_eq!(
            apply("date-to-text", json!({"start": "2025-03-14", "end": "2025-03-20"})),
            json!("14/03/2025 - 20/03/2025")
        );
        assert_eq!(apply("date-to-text", json!("2025-01-02")), json!("02/01/2025"));
    }

    #[test]
    fn test_invalid_date_is_an_execution_error() {
        let registry = registry();
        let t = registry.get_transformation("date-to-datetime").unwrap();
        let err = t.apply(&json!({"start": "next tuesday"})).unwrap_err();
        assert!(matches!(err.reason, ValueError::InvalidValue { .. }));
    }

    #[test]
    fn test_number_to_integer_rounds() {
        assert_eq!(apply("number-to-integer", json!(-2.5)), json!(-3));
        assert_eq!(apply("number-to-integer", json!(7)), json!(7));
    }

    #[test]
    fn test_number_to_integer_rejects_out_of_range() {
        let registry = registry();
        let t = registry.get_transformation("number-to-integer").unwrap();
        // 2^63 is one past i64::MAX and must not saturate
        let err = t.apply(&json!(9_223_372_036_854_775_808.0_f64)).unwrap_err();
        assert!(matches!(err.reason, ValueError::InvalidValue { .. }));
        assert!(t.apply(&json!(-1e19)).is_err());
        assert_eq!(
            t.apply(&json!(-9_223_372_036_854_775_808.0_f64)).unwrap(),
            json!(i64::MIN)
        );
    }

    #[test]
    fn test_url_normalize_rejects_garbage() {
        let registry = registry();
        let t = registry.get_transformation("url-normalize").unwrap();
        assert!(t.apply(&json!("http://[::1")).is_err());
        assert_eq!(t.apply(&json!("  ")).unwrap(), json!(""));
    }

    #[test]
    fn test_files_to_gallery_requires_urls() {
        let registry = registry();
        let t = registry.get_transformation("files-to-gallery").unwrap();
        let err = t.apply(&json!([{"name": "orphan.png"}])).unwrap_err();
        assert_eq!(err.reason.to_string(), "file 'orphan.png' has no url");
    }

    #[test]
    fn test_files_to_image_without_images_is_empty() {
        let value = json!([{"name": "a.pdf", "file": {"url": "https://x/a.pdf"}}]);
        assert_eq!(apply("files-to-image", value), json!(""));
    }

    #[test]
    fn test_duplicate_ids_are_rejected() {
        let extra = Transformation::builder(
            "richText-to-plain",
            SourceFieldType::RichText,
            TargetFieldType::String,
            built_in::plain_text,
        )
        .build();
        let result = TransformationRegistry::builder()
            .with_built_ins()
            .register(extra)
            .build();
        assert!(matches!(result, Err(Error::Configuration { .. })));
    }

    #[test]
    fn test_custom_transformation_registers_alongside_built_ins() {
        fn upper(value: &Value) -> Result<Value, ValueError> {
            let plain = crate::transformer::values::plain_text(value)?;
            Ok(json!(plain.to_uppercase()))
        }
        let registry = TransformationRegistry::builder()
            .with_built_ins()
            .register(
                Transformation::builder("title-to-upper", SourceFieldType::Title, TargetFieldType::String, upper)
                    .name("Uppercase title")
                    .example(json!([{"plain_text": "hi"}]), json!("HI"))
                    .build(),
            )
            .build()
            .unwrap();
        let ids: Vec<_> = registry
            .find_transformations(SourceFieldType::Title, TargetFieldType::String)
            .into_iter()
            .map(|t| t.id.clone())
            .collect();
        assert_eq!(ids, vec!["title-to-plain", "title-to-upper"]);
    }
}
