//! Single pair compatibility check

use super::utils::{build_engine, parse_value};
use crate::cli::CheckArgs;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::output::OutputWriter;
use fieldmap_core::{MappingEngine, SourceField, TargetField, ValidationResult};

/// Validate one source/target type pair, optionally with a transformation and sample
pub fn handle_check(args: CheckArgs, config: &Config, output: &mut OutputWriter) -> Result<()> {
    let engine = build_engine(config, args.lenient)?;
    let result = check_pair(&engine, &args);

    output.validation_result(&result)?;

    if !result.is_valid {
        // A wrong id is easier to fix with the alternatives on screen
        if args.transformation.is_some() {
            let alternatives = engine.find_transformations(args.source, args.target);
            if !alternatives.is_empty() {
                output.section("Transformations for this pair")?;
                let rows = alternatives
                    .iter()
                    .map(|t| vec![t.id.clone(), t.name.clone()])
                    .collect();
                output.table(&["ID", "Name"], rows)?;
            }
        }
        return Err(Error::InvalidMappings { count: 1 });
    }

    if result.sample_failed() {
        output.warning("The sample did not transform; the mapping itself is valid")?;
    }

    Ok(())
}

fn check_pair(engine: &MappingEngine, args: &CheckArgs) -> ValidationResult {
    let source = SourceField::new("source", args.source.as_str(), args.source);
    let target = TargetField::new("target", args.target.as_str(), args.target);
    let transformation = args.transformation.as_deref();

    match &args.sample {
        Some(sample) => {
            engine.validate_mapping_with_sample(&source, &target, transformation, &parse_value(sample))
        }
        None => engine.validate_mapping(&source, &target, transformation),
    }
}
