//! Cached versus uncached transformation timings and cache tuning

use super::utils::build_engine;
use crate::cli::{BenchmarkArgs, OutputFormat};
use crate::config::{CacheSettings, Config};
use crate::error::{Error, Result};
use crate::output::OutputWriter;
use fieldmap_core::benchmark::{generate_samples, run_benchmark, to_csv, BenchmarkResult};
use fieldmap_core::optimization::{analyze, auto_optimize};
use fieldmap_core::{MappingEngine, MappingError, OptimizationReport, Transformation};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BenchmarkReport {
    results: Vec<BenchmarkResult>,
    analysis: OptimizationReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    saved_to: Option<PathBuf>,
}

/// Benchmark the requested transformations over generated samples
pub fn handle_benchmark(
    args: BenchmarkArgs,
    explicit_path: Option<&Path>,
    config: &Config,
    output: &mut OutputWriter,
) -> Result<()> {
    if args.iterations == 0 {
        return Err(Error::invalid_args("--iterations must be at least 1"));
    }
    if args.samples == 0 {
        return Err(Error::invalid_args("--samples must be at least 1"));
    }

    let engine = build_engine(config, false)?;
    let targets = select(&engine, &args.transformations)?;

    let progress = output.progress_bar(targets.len() as u64, "benchmarking");
    let mut results = Vec::with_capacity(targets.len());
    for transformation in &targets {
        let samples = generate_samples(transformation.source_type, args.samples);
        results.push(run_benchmark(&engine, &transformation.id, &samples, args.iterations)?);
        if let Some(pb) = &progress {
            pb.inc(1);
        }
    }
    if let Some(pb) = progress {
        pb.finish_and_clear();
    }

    if let Some(path) = &args.csv {
        fs::write(path, to_csv(&results))?;
        output.info(&format!("Wrote CSV to {}", path.display()))?;
    }

    let (analysis, saved_to) = if args.optimize {
        let before = engine.cache_config();
        let (analysis, tuned) = auto_optimize(&engine, &results);
        let saved_to = if tuned != before {
            let path = Config::locate(explicit_path).unwrap_or_else(Config::project_config_path);
            let mut updated = config.clone();
            updated.cache = CacheSettings::from(&tuned);
            updated.save(&path)?;
            Some(path)
        } else {
            None
        };
        (analysis, saved_to)
    } else {
        (analyze(&results, &engine.cache_config()), None)
    };

    if output.format() != OutputFormat::Human {
        return output.data(&BenchmarkReport {
            results,
            analysis,
            saved_to,
        });
    }

    output.section(&format!(
        "Benchmark ({} samples x {} iterations)",
        args.samples, args.iterations
    ))?;
    output.table(
        &["Transformation", "Uncached µs", "Cached µs", "Improvement", "Hit rate"],
        rows(&results),
    )?;

    output.section("Recommendations")?;
    if analysis.recommendations.is_empty() {
        output.writeln("No changes suggested")?;
    }
    for recommendation in &analysis.recommendations {
        output.writeln(&format!("[{}] {}", recommendation.impact(), recommendation))?;
    }

    if args.optimize {
        match &saved_to {
            Some(path) => output.success(&format!("✓ Saved tuned cache settings to {}", path.display()))?,
            None => output.info("Cache settings already fit this workload")?,
        }
    }
    Ok(())
}

/// Transformations to measure, in registry order when none are named
fn select<'e>(engine: &'e MappingEngine, ids: &[String]) -> Result<Vec<&'e Transformation>> {
    if ids.is_empty() {
        return Ok(engine.registry().iter().collect());
    }
    ids.iter()
        .map(|id| -> Result<&'e Transformation> {
            engine.get_transformation(id).ok_or_else(|| {
                MappingError::TransformationNotFound {
                    transformation_id: Some(id.clone()),
                }
                .into()
            })
        })
        .collect()
}

fn rows(results: &[BenchmarkResult]) -> Vec<Vec<String>> {
    results
        .iter()
        .map(|r| {
            vec![
                r.transformation_id.clone(),
                format!("{:.3}", r.uncached_avg_micros),
                format!("{:.3}", r.cached_avg_micros),
                format!("{:.1}%", r.improvement_pct),
                format!("{:.1}%", r.cache_stats.hit_rate * 100.0),
            ]
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::test_support::capture;
    use tempfile::TempDir;

    fn args(ids: &[&str]) -> BenchmarkArgs {
        BenchmarkArgs {
            transformations: ids.iter().map(|s| s.to_string()).collect(),
            iterations: 3,
            samples: 5,
            optimize: false,
            csv: None,
        }
    }

    #[test]
    fn test_default_selection_covers_the_catalog() {
        let engine = MappingEngine::new().unwrap();
        let selected = select(&engine, &[]).unwrap();
        assert_eq!(selected.len(), engine.registry().len());
    }

    #[test]
    fn test_benchmark_writes_csv() {
        let dir = TempDir::new().unwrap();
        let csv = dir.path().join("bench.csv");
        let mut bench = args(&["number-to-string", "richText-to-html"]);
        bench.csv = Some(csv.clone());

        let (mut output, captured) = capture(OutputFormat::Json);
        handle_benchmark(bench, None, &Config::default(), &mut output).unwrap();

        let report = captured.json();
        let results = report["results"].as_array().unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0]["transformationId"], "number-to-string");
        assert_eq!(results[0]["samples"], 5);
        // 5 distinct samples over 3 passes: first pass misses, the rest hit
        assert_eq!(results[0]["cacheStats"]["missCount"], 5);
        assert_eq!(results[0]["cacheStats"]["hitCount"], 10);
        assert!(report.get("savedTo").is_none());

        let text = fs::read_to_string(csv).unwrap();
        assert_eq!(text.lines().count(), 3);
        assert!(text.starts_with("transformation_id,"));
    }

    #[test]
    fn test_optimize_saves_tuned_cache_settings() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("fieldmap.toml");
        let mut config = Config::default();
        config.cache.max_entries = 4;
        config.save(&path).unwrap();

        let mut bench = args(&["number-to-string"]);
        bench.samples = 20;
        bench.optimize = true;
        let (mut output, captured) = capture(OutputFormat::Json);
        handle_benchmark(bench, Some(&path), &config, &mut output).unwrap();

        let report = captured.json();
        assert_eq!(report["savedTo"], path.display().to_string());
        let saved = Config::from_file(&path).unwrap();
        assert_eq!(saved.cache.max_entries, 6);
        assert_eq!(saved.cache.ttl_secs, config.cache.ttl_secs * 2);
    }

    #[test]
    fn test_optimize_without_changes_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("fieldmap.toml");
        let mut config = Config::default();
        config.cache.max_entries = 50;

        let mut bench = args(&["number-to-string"]);
        bench.optimize = true;
        let (mut output, captured) = capture(OutputFormat::Human);
        handle_benchmark(bench, Some(&path), &config, &mut output).unwrap();

        assert!(!path.exists());
        let text = captured.text();
        assert!(text.contains("Recommendations"));
        assert!(text.contains("already fit"));
    }

    #[test]
    fn test_unknown_id_is_reported() {
        let (mut output, _) = capture(OutputFormat::Json);
        let result = handle_benchmark(args(&["nope"]), None, &Config::default(), &mut output);
        assert!(matches!(result, Err(Error::Mapping(_))));
    }

    #[test]
    fn test_zero_iterations_or_samples_is_an_argument_error() {
        let (mut output, _) = capture(OutputFormat::Json);
        let mut bench = args(&[]);
        bench.iterations = 0;
        let result = handle_benchmark(bench, None, &Config::default(), &mut output);
        assert!(matches!(result, Err(Error::InvalidArgs(_))));

        let mut bench = args(&[]);
        bench.samples = 0;
        let result = handle_benchmark(bench, None, &Config::default(), &mut output);
        assert!(matches!(result, Err(Error::InvalidArgs(_))));
    }
}
