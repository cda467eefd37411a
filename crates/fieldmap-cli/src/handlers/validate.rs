//! Mapping configuration validation

use super::utils::{build_engine, load_mapping_config};
use crate::cli::{OutputFormat, ValidateArgs};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::logging::timing::Timer;
use crate::output::OutputWriter;
use fieldmap_core::ExportData;
use std::fs;

/// Validate every mapping of a saved configuration
pub fn handle_validate(args: ValidateArgs, config: &Config, output: &mut OutputWriter) -> Result<()> {
    let _timer = Timer::with_details("validate", &args.mapping_config.display().to_string());
    output.info(&format!("Validating mappings: {}", args.mapping_config.display()))?;

    let mapping_config = load_mapping_config(&args.mapping_config)?;
    let engine = build_engine(config, args.lenient)?;
    let export = ExportData::collect(&engine, mapping_config)?;

    if let Some(path) = &args.export {
        fs::write(path, export.to_json_pretty()?)?;
        output.info(&format!("Wrote export to {}", path.display()))?;
    }

    if output.format() == OutputFormat::Human {
        render_human(&export, output)?;
    } else {
        output.data(&export)?;
    }

    let invalid = export.invalid_count();
    tracing::info!(
        mappings = export.validations.len(),
        invalid,
        "Validated mapping configuration"
    );
    if invalid > 0 {
        return Err(Error::InvalidMappings { count: invalid });
    }
    Ok(())
}

fn render_human(export: &ExportData, output: &mut OutputWriter) -> Result<()> {
    let rows = export
        .config
        .mappings
        .iter()
        .zip(&export.validations)
        .map(|(spec, validation)| {
            vec![
                validation.mapping_id.clone(),
                spec.source_field_id.clone(),
                spec.target_field_id.clone(),
                validation.result.compatibility_level.to_string(),
                validation
                    .result
                    .transformation_id
                    .clone()
                    .unwrap_or_else(|| "-".to_string()),
                if validation.result.is_valid { "ok" } else { "invalid" }.to_string(),
            ]
        })
        .collect();

    output.section(&format!("Mappings in '{}'", export.config.name))?;
    output.table(&["Mapping", "Source", "Target", "Level", "Transformation", "Status"], rows)?;

    for validation in export.validations.iter().filter(|v| !v.result.is_valid) {
        let mut line = format!("{}: {}", validation.mapping_id, validation.result.error_message().unwrap_or_default());
        if let Some(suggestion) = &validation.result.suggestion {
            line.push_str(&format!(" ({})", suggestion));
        }
        output.error(&line)?;
    }

    if export.invalid_count() == 0 {
        output.success(&format!("✓ All {} mapping(s) are valid", export.validations.len()))?;
    }
    Ok(())
}
