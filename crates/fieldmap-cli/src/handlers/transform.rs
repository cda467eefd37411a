//! One-off value transformation

use super::utils::{build_engine, parse_value, read_document};
use crate::cli::{OutputFormat, TransformArgs};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::output::{format_value_compact, OutputWriter};
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TransformOutput<'a> {
    transformation_id: &'a str,
    input: Value,
    output: Value,
}

/// Run one value through a transformation and print the result
pub fn handle_transform(args: TransformArgs, config: &Config, output: &mut OutputWriter) -> Result<()> {
    let input = match (&args.value, &args.file) {
        (_, Some(path)) => read_document::<Value>(path)?,
        (Some(text), None) => parse_value(text),
        (None, None) => return Err(Error::invalid_args("a VALUE or --file is required")),
    };

    let engine = build_engine(config, false)?;
    let transformed = engine.get_or_compute(&args.transformation, &input)?;
    tracing::debug!(transformation = %args.transformation, "Transformed value");

    if output.format() != OutputFormat::Human {
        return output.data(&TransformOutput {
            transformation_id: &args.transformation,
            input,
            output: transformed,
        });
    }

    output.info(&format!("{} → {}", args.transformation, format_value_compact(&input)))?;
    match &transformed {
        Value::String(text) => output.writeln(text)?,
        other => output.data(other)?,
    }
    output.debug(&format!("cache: {:?}", engine.cache_stats()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::test_support::capture;
    use fieldmap_core::MappingError;
    use serde_json::json;

    fn args(id: &str, value: &str) -> TransformArgs {
        TransformArgs {
            transformation: id.to_string(),
            value: Some(value.to_string()),
            file: None,
        }
    }

    #[test]
    fn test_transform_prints_json_result() {
        let (mut output, captured) = capture(OutputFormat::Json);
        handle_transform(
            args("richText-to-plain", r#"[{"plain_text":"Hello "},{"plain_text":"World"}]"#),
            &Config::default(),
            &mut output,
        )
        .unwrap();

        let printed = captured.json();
        assert_eq!(printed["transformationId"], "richText-to-plain");
        assert_eq!(printed["output"], json!("Hello World"));
    }

    #[test]
    fn test_plain_string_argument_is_accepted() {
        let (mut output, captured) = capture(OutputFormat::Human);
        handle_transform(args("url-normalize", "example.com/about"), &Config::default(), &mut output).unwrap();
        assert!(captured.text().lines().any(|line| line == "https://example.com/about"));
    }

    #[test]
    fn test_unknown_transformation_is_a_mapping_error() {
        let (mut output, _) = capture(OutputFormat::Json);
        let result = handle_transform(args("nope", "1"), &Config::default(), &mut output);
        assert!(matches!(
            result,
            Err(Error::Mapping(MappingError::TransformationNotFound { .. }))
        ));
    }

    #[test]
    fn test_value_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("value.yaml");
        std::fs::write(&path, "- name: a\n- name: b\n").unwrap();

        let (mut output, captured) = capture(OutputFormat::Json);
        handle_transform(
            TransformArgs {
                transformation: "multiSelect-to-tags".to_string(),
                value: None,
                file: Some(path),
            },
            &Config::default(),
            &mut output,
        )
        .unwrap();
        assert_eq!(captured.json()["output"], json!(["a", "b"]));
    }
}
