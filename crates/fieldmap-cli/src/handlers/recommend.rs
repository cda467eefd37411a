//! Source field recommendations for a target type

use super::utils::{build_engine, load_mapping_config};
use crate::cli::{OutputFormat, RecommendArgs};
use crate::config::Config;
use crate::error::Result;
use crate::output::OutputWriter;
use fieldmap_core::{get_compatibility_level, recommend_sources, MappingEngine, SourceField, TargetFieldType};

/// Group the configuration's source fields by how well they fill `args.target`
pub fn handle_recommend(args: RecommendArgs, config: &Config, output: &mut OutputWriter) -> Result<()> {
    let mapping_config = load_mapping_config(&args.mapping_config)?;
    let recommendations = recommend_sources(args.target, &mapping_config.source_fields);

    if output.format() != OutputFormat::Human {
        return output.data(&recommendations);
    }

    let engine = build_engine(config, false)?;

    output.section(&format!("Direct sources for {}", args.target))?;
    output.table(&["Field", "Type", "Level"], rows(&recommendations.direct, args.target, None))?;

    output.section("Sources needing a transformation")?;
    output.table(
        &["Field", "Type", "Level", "Transformations"],
        rows(&recommendations.requires_transformation, args.target, Some(&engine)),
    )?;

    if !recommendations.incompatible.is_empty() {
        let names: Vec<&str> = recommendations.incompatible.iter().map(|f| f.name.as_str()).collect();
        output.info(&format!("Incompatible: {}", names.join(", ")))?;
    }

    Ok(())
}

fn rows(fields: &[&SourceField], target: TargetFieldType, engine: Option<&MappingEngine>) -> Vec<Vec<String>> {
    fields
        .iter()
        .map(|field| {
            let mut row = vec![
                field.name.clone(),
                field.field_type.to_string(),
                get_compatibility_level(field.field_type, target).to_string(),
            ];
            if let Some(engine) = engine {
                let ids: Vec<String> = engine
                    .find_transformations(field.field_type, target)
                    .into_iter()
                    .map(|t| t.id.clone())
                    .collect();
                row.push(ids.join(", "));
            }
            row
        })
        .collect()
}
