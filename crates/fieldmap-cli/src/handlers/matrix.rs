//! Compatibility matrix and transformation catalog listings

use super::utils::build_engine;
use crate::cli::{MatrixArgs, OutputFormat, TransformationsArgs};
use crate::config::Config;
use crate::error::Result;
use crate::output::OutputWriter;
use fieldmap_core::compatibility::{matrix_rows, MatrixRow};
use fieldmap_core::{CompatibilityLevel, Transformation};
use serde::Serialize;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct MatrixCell {
    source: String,
    target: String,
    level: CompatibilityLevel,
    transformations: usize,
}

/// Print the compatibility matrix, best targets first within each source
pub fn handle_matrix(args: MatrixArgs, config: &Config, output: &mut OutputWriter) -> Result<()> {
    let engine = build_engine(config, false)?;

    let rows: Vec<MatrixRow> = matrix_rows()
        .into_iter()
        .filter(|row| args.source.map_or(true, |source| row.source == source))
        .collect();

    let cells: Vec<MatrixCell> = rows
        .iter()
        .flat_map(|row| {
            let mut levels = row.levels.clone();
            levels.sort_by(|a, b| b.1.cmp(&a.1));
            levels
                .into_iter()
                .filter(|(_, level)| args.all || *level != CompatibilityLevel::None)
                .map(|(target, level)| MatrixCell {
                    source: row.source.to_string(),
                    target: target.to_string(),
                    level,
                    transformations: engine.find_transformations(row.source, target).len(),
                })
                .collect::<Vec<_>>()
        })
        .collect();

    if output.format() != OutputFormat::Human {
        return output.data(&cells);
    }

    output.section("Compatibility Matrix")?;
    let table = cells
        .iter()
        .map(|cell| {
            vec![
                cell.source.clone(),
                cell.target.clone(),
                cell.level.to_string(),
                cell.transformations.to_string(),
            ]
        })
        .collect();
    output.table(&["Source", "Target", "Level", "Transformations"], table)?;
    output.info(&format!("{} pair(s)", cells.len()))
}

/// List the transformation catalog, optionally filtered by source and target
pub fn handle_transformations(args: TransformationsArgs, config: &Config, output: &mut OutputWriter) -> Result<()> {
    let engine = build_engine(config, false)?;

    let selected: Vec<&Transformation> = engine
        .registry()
        .iter()
        .filter(|t| args.source.map_or(true, |s| t.source_type == s))
        .filter(|t| args.target.map_or(true, |target| t.target_type == target))
        .collect();

    if output.format() != OutputFormat::Human {
        return output.data(&selected);
    }

    if selected.is_empty() {
        output.warning("No transformations match the filter")?;
        return Ok(());
    }

    output.section("Transformations")?;
    let rows = selected
        .iter()
        .map(|t| {
            vec![
                t.id.clone(),
                t.source_type.to_string(),
                t.target_type.to_string(),
                t.performance_impact.to_string(),
                t.description.clone(),
            ]
        })
        .collect();
    output.table(&["ID", "Source", "Target", "Cost", "Description"], rows)?;
    output.info(&format!("{} of {} transformation(s)", selected.len(), engine.registry().len()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::test_support::capture;
    use fieldmap_core::{SourceFieldType, TargetFieldType};

    #[test]
    fn test_matrix_row_is_sorted_and_skips_none() {
        let (mut output, captured) = capture(OutputFormat::Json);
        handle_matrix(
            MatrixArgs {
                source: Some(SourceFieldType::Number),
                all: false,
            },
            &Config::default(),
            &mut output,
        )
        .unwrap();

        let cells = captured.json();
        let cells = cells.as_array().unwrap();
        assert_eq!(cells[0]["target"], "number");
        assert_eq!(cells[0]["level"], "PERFECT");
        assert!(cells.iter().all(|c| c["level"] != "NONE"));
    }

    #[test]
    fn test_matrix_all_includes_incompatible_cells() {
        let (mut output, captured) = capture(OutputFormat::Json);
        handle_matrix(
            MatrixArgs {
                source: Some(SourceFieldType::Checkbox),
                all: true,
            },
            &Config::default(),
            &mut output,
        )
        .unwrap();

        let cells = captured.json();
        let cells = cells.as_array().unwrap();
        assert_eq!(cells.len(), TargetFieldType::ALL.len());
        assert_eq!(cells.last().unwrap()["level"], "NONE");
    }

    #[test]
    fn test_transformations_filter() {
        let (mut output, captured) = capture(OutputFormat::Json);
        handle_transformations(
            TransformationsArgs {
                source: Some(SourceFieldType::RichText),
                target: Some(TargetFieldType::Html),
            },
            &Config::default(),
            &mut output,
        )
        .unwrap();

        let listed = captured.json();
        let ids: Vec<&str> = listed
            .as_array()
            .unwrap()
            .iter()
            .map(|t| t["id"].as_str().unwrap())
            .collect();
        assert_eq!(ids, vec!["richText-to-html"]);
    }

    #[test]
    fn test_human_listing_is_a_table() {
        let (mut output, captured) = capture(OutputFormat::Human);
        handle_transformations(
            TransformationsArgs {
                source: Some(SourceFieldType::Checkbox),
                target: None,
            },
            &Config::default(),
            &mut output,
        )
        .unwrap();

        let text = captured.text();
        assert!(text.contains("=== Transformations ==="));
        assert!(text.contains("checkbox-to-string"));
        assert!(text.contains("checkbox-to-text"));
    }
}
