//! Cached versus uncached timing of a transformation

use crate::cache::{CacheConfig, CacheStats, TransformationCache};
use crate::engine::MappingEngine;
use crate::error::MappingError;
use crate::types::{SourceFieldType, TargetFieldType};
use crate::{Error, Result};
use serde::Serialize;
use serde_json::{json, Value};
use std::time::{Duration, Instant};

/// Timing of one transformation over a sample set
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BenchmarkResult {
    pub transformation_id: String,
    pub source_type: SourceFieldType,
    pub target_type: TargetFieldType,
    pub samples: usize,
    pub iterations: usize,
    /// Mean time per call without a cache, in microseconds
    pub uncached_avg_micros: f64,
    /// Mean time per call through a fresh cache, in microseconds
    pub cached_avg_micros: f64,
    pub improvement_pct: f64,
    /// Counters of the cache used by the cached pass
    pub cache_stats: CacheStats,
}

fn average_micros(total: Duration, calls: usize) -> f64 {
    if calls == 0 {
        0.0
    } else {
        total.as_secs_f64() * 1_000_000.0 / calls as f64
    }
}

/// `count` distinct values shaped like a Notion property of `source_type`
///
/// Every built-in transformation for the type accepts them. Checkbox has only
/// two values, so its samples alternate.
pub fn generate_samples(source_type: SourceFieldType, count: usize) -> Vec<Value> {
    (0..count).map(|n| sample(source_type, n)).collect()
}

fn sample_date(n: usize) -> String {
    format!("{}-{:02}-{:02}", 2025 + n / 336, (n / 28) % 12 + 1, n % 28 + 1)
}

fn sample(source_type: SourceFieldType, n: usize) -> Value {
    use SourceFieldType as S;
    match source_type {
        S::Title | S::RichText => json!([
            {"plain_text": "Sample "},
            {"plain_text": format!("text {n}"), "annotations": {"bold": n % 2 == 0}}
        ]),
        S::Number => json!(n as f64 * 10.5 + 0.1),
        S::Select | S::Status => json!({"name": format!("Option {n}")}),
        S::MultiSelect => json!([{"name": format!("Option A{n}")}, {"name": format!("Option B{n}")}]),
        S::Date => json!({"start": sample_date(n), "end": null}),
        S::Checkbox => json!(n % 2 == 0),
        S::Url => json!(format!("example{n}.com/page")),
        S::Email => json!(format!("user{n}@example.com")),
        S::PhoneNumber => json!(format!("+1 555 {:04}", n % 10_000)),
        S::Files => json!([
            {"name": format!("document{n}.pdf"), "type": "file", "file": {"url": format!("https://files.example.com/document{n}.pdf")}},
            {"name": format!("image{n}.jpg"), "type": "external", "external": {"url": format!("https://cdn.example.com/image{n}.jpg")}}
        ]),
        S::People => json!([{"object": "user", "id": format!("u-{n}"), "name": format!("Person {n}")}]),
        S::Relation => json!([{"id": format!("page-{n}")}]),
        S::CreatedTime | S::LastEditedTime => {
            json!(format!("{}T{:02}:{:02}:00.000Z", sample_date(n), n % 24, n % 60))
        }
    }
}

/// Run every sample `iterations` times, once directly and once through a cache
///
/// The cached pass uses its own cache, configured like the engine's, so the
/// engine's statistics are untouched.
pub fn run_benchmark(
    engine: &MappingEngine,
    transformation_id: &str,
    samples: &[Value],
    iterations: usize,
) -> Result<BenchmarkResult> {
    run_benchmark_with_config(engine, transformation_id, samples, iterations, engine.cache_config())
}

/// [`run_benchmark`] with an explicit configuration for the cached pass
pub fn run_benchmark_with_config(
    engine: &MappingEngine,
    transformation_id: &str,
    samples: &[Value],
    iterations: usize,
    cache_config: CacheConfig,
) -> Result<BenchmarkResult> {
    if samples.is_empty() || iterations == 0 {
        return Err(Error::Validation {
            field: if samples.is_empty() { "samples" } else { "iterations" }.to_string(),
            message: "benchmark needs at least one sample and one iteration".to_string(),
            expected: Some(">= 1".to_string()),
        });
    }
    let transformation = engine
        .get_transformation(transformation_id)
        .ok_or_else(|| MappingError::TransformationNotFound {
            transformation_id: Some(transformation_id.to_string()),
        })?;

    let calls = samples.len() * iterations;

    let started = Instant::now();
    for _ in 0..iterations {
        for sample in samples {
            transformation.apply(sample)?;
        }
    }
    let uncached = started.elapsed();

    let mut cache = TransformationCache::with_config(cache_config);
    let started = Instant::now();
    for _ in 0..iterations {
        for sample in samples {
            cache.get_or_compute(transformation, sample)?;
        }
    }
    let cached = started.elapsed();

    let uncached_avg_micros = average_micros(uncached, calls);
    let cached_avg_micros = average_micros(cached, calls);
    let improvement_pct = if uncached_avg_micros > 0.0 {
        (uncached_avg_micros - cached_avg_micros) / uncached_avg_micros * 100.0
    } else {
        0.0
    };

    Ok(BenchmarkResult {
        transformation_id: transformation.id.clone(),
        source_type: transformation.source_type,
        target_type: transformation.target_type,
        samples: samples.len(),
        iterations,
        uncached_avg_micros,
        cached_avg_micros,
        improvement_pct,
        cache_stats: cache.stats(),
    })
}

/// Render results as CSV with a header row
pub fn to_csv(results: &[BenchmarkResult]) -> String {
    let mut csv = String::from(
        "transformation_id,source_type,target_type,samples,iterations,uncached_avg_us,cached_avg_us,improvement_pct,cache_hit_rate\n",
    );
    for r in results {
        csv.push_str(&format!(
            "{},{},{},{},{},{:.3},{:.3},{:.1},{:.3}\n",
            r.transformation_id,
            r.source_type,
            r.target_type,
            r.samples,
            r.iterations,
            r.uncached_avg_micros,
            r.cached_avg_micros,
            r.improvement_pct,
            r.cache_stats.hit_rate
        ));
    }
    csv
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_benchmark_reports_both_passes() {
        let engine = MappingEngine::new().unwrap();
        let samples = vec![json!([{"name": "a"}, {"name": "b"}]), json!([])];
        let result = run_benchmark(&engine, "multiSelect-to-string", &samples, 20).unwrap();
        assert_eq!(result.samples, 2);
        assert_eq!(result.iterations, 20);
        assert_eq!(result.source_type, SourceFieldType::MultiSelect);
        assert!(result.uncached_avg_micros >= 0.0);
        assert_eq!(result.cache_stats.miss_count, 2);
        assert_eq!(result.cache_stats.hit_count, 38);
        assert_eq!(engine.cache_stats().miss_count, 0);
    }

    #[test]
    fn test_cached_pass_follows_the_cache_config() {
        let engine = MappingEngine::new().unwrap();
        let samples = generate_samples(SourceFieldType::Number, 10);
        let config = CacheConfig {
            max_entries: 4,
            ..CacheConfig::default()
        };
        let result = run_benchmark_with_config(&engine, "number-to-string", &samples, 3, config).unwrap();
        // Cycling through more samples than fit evicts each entry before reuse
        assert_eq!(result.cache_stats.hit_count, 0);
        assert_eq!(result.cache_stats.miss_count, 30);
        assert_eq!(result.cache_stats.size, 4);
        assert_eq!(result.cache_stats.evictions, 26);
    }

    #[test]
    fn test_benchmark_rejects_bad_input() {
        let engine = MappingEngine::new().unwrap();
        assert!(run_benchmark(&engine, "number-to-string", &[], 3).is_err());
        assert!(matches!(
            run_benchmark(&engine, "missing", &[json!(1)], 3),
            Err(Error::Mapping(MappingError::TransformationNotFound { .. }))
        ));
        assert!(matches!(
            run_benchmark(&engine, "number-to-string", &[json!("x")], 1),
            Err(Error::Transformation(_))
        ));
    }

    #[test]
    fn test_generated_samples_are_distinct() {
        for source_type in SourceFieldType::ALL {
            let samples = generate_samples(source_type, 40);
            assert_eq!(samples.len(), 40);
            let distinct: HashSet<String> = samples.iter().map(Value::to_string).collect();
            let expected = if source_type == SourceFieldType::Checkbox { 2 } else { 40 };
            assert_eq!(distinct.len(), expected, "{source_type}");
        }
        assert!(generate_samples(SourceFieldType::Title, 0).is_empty());
    }

    #[test]
    fn test_every_built_in_accepts_generated_samples() {
        let engine = MappingEngine::new().unwrap();
        for t in engine.registry().iter() {
            for sample in generate_samples(t.source_type, 400) {
                if let Err(e) = t.apply(&sample) {
                    panic!("{} rejected {}: {}", t.id, sample, e);
                }
            }
        }
    }

    #[test]
    fn test_csv_has_header_and_rows() {
        let mut cache = TransformationCache::new();
        let registry = crate::TransformationRegistry::with_built_ins().unwrap();
        let t = registry.get_transformation("number-to-string").unwrap();
        cache.get_or_compute(t, &json!(1)).unwrap();
        cache.get_or_compute(t, &json!(1)).unwrap();

        let result = BenchmarkResult {
            transformation_id: "number-to-string".to_string(),
            source_type: SourceFieldType::Number,
            target_type: TargetFieldType::String,
            samples: 1,
            iterations: 10,
            uncached_avg_micros: 2.0,
            cached_avg_micros: 0.5,
            improvement_pct: 75.0,
            cache_stats: cache.stats(),
        };
        let csv = to_csv(&[result]);
        let lines: Vec<_> = csv.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1], "number-to-string,number,string,1,10,2.000,0.500,75.0,0.500");
    }
}
