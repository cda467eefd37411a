//! Batch record transformation

use super::utils::{build_engine, load_mapping_config, read_document};
use crate::cli::ApplyArgs;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::logging::timing::Timer;
use crate::output::OutputWriter;
use fieldmap_core::MappingPipeline;
use serde_json::Value;
use std::fs;

/// Run every record of a file through the valid mappings of a configuration
pub fn handle_apply(args: ApplyArgs, config: &Config, output: &mut OutputWriter) -> Result<()> {
    let timer = Timer::with_details("apply", &args.records.display().to_string());

    let mapping_config = load_mapping_config(&args.mapping_config)?;
    let engine = build_engine(config, false)?;
    let pipeline = MappingPipeline::from_config(&engine, mapping_config)?;
    if pipeline.is_empty() {
        output.warning("No valid mappings; every record will be empty")?;
    }

    let records = match read_document::<Value>(&args.records)? {
        Value::Array(records) => records,
        record @ Value::Object(_) => vec![record],
        _ => {
            return Err(Error::InvalidFormat {
                path: args.records.clone(),
                expected: "a JSON array of records or a single record object".to_string(),
            })
        }
    };

    let progress = if config.output.progress {
        output.progress_bar(records.len() as u64, "records")
    } else {
        None
    };

    let batch = pipeline.transform_batch_with(&records, |_, _| {
        if let Some(pb) = &progress {
            pb.inc(1);
        }
    })?;
    if let Some(pb) = progress {
        pb.finish_and_clear();
    }

    let stats = engine.cache_stats();
    tracing::info!(
        records = batch.records.len(),
        failed_fields = batch.failed_fields,
        cache_hits = stats.hit_count,
        cache_misses = stats.miss_count,
        elapsed_ms = timer.elapsed().as_millis() as u64,
        "Applied mapping configuration"
    );

    match &args.output_file {
        Some(path) => {
            fs::write(path, serde_json::to_string_pretty(&batch)?)?;
            output.success(&format!(
                "✓ Wrote {} record(s) to {}",
                batch.records.len(),
                path.display()
            ))?;
        }
        None => output.batch_outcome(&batch)?,
    }
    output.debug(&format!(
        "cache hit rate {:.1}% ({} hits, {} misses), {:.0}% full",
        stats.hit_rate * 100.0,
        stats.hit_count,
        stats.miss_count,
        stats.utilization() * 100.0
    ))?;

    if args.fail_on_error && batch.failed_fields > 0 {
        return Err(Error::FailedFields {
            count: batch.failed_fields,
        });
    }
    Ok(())
}
