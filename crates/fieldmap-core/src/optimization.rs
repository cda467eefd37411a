//! Cache tuning from benchmark results
//!
//! [`analyze`] turns a set of [`BenchmarkResult`]s into per-transformation
//! figures and typed [`CacheRecommendation`]s. [`auto_optimize`] applies the
//! capacity and TTL recommendations to an engine's cache.

use crate::benchmark::BenchmarkResult;
use crate::cache::{CacheConfig, CacheStats};
use crate::engine::MappingEngine;
use serde::Serialize;
use std::fmt;
use std::time::Duration;
use tracing::info;

/// Improvement above which a transformation should keep its results cached
pub const PRIORITIZE_CACHING_PCT: f64 = 50.0;

/// Improvement below which caching a transformation is not worth the memory
pub const SKIP_CACHING_PCT: f64 = 5.0;

/// Uncached mean above which a transformation is flagged as slow
pub const SLOW_TRANSFORMATION_MICROS: f64 = 1_000.0;

/// Smallest capacity a decrease recommendation suggests
pub const MIN_SUGGESTED_CAPACITY: usize = 100;

/// How much acting on a recommendation is expected to matter
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Impact {
    Low,
    Medium,
    High,
}

impl fmt::Display for Impact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Impact::Low => "low",
            Impact::Medium => "medium",
            Impact::High => "high",
        })
    }
}

/// One suggested change
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum CacheRecommendation {
    /// The cache makes this transformation much faster
    PrioritizeCaching { transformation_id: String, improvement_pct: f64 },
    /// The cache barely helps this transformation
    SkipCaching { transformation_id: String, improvement_pct: f64 },
    /// Slow even before caching; the transformation itself needs work
    OptimizeTransformation { transformation_id: String, uncached_avg_micros: f64 },
    IncreaseCapacity { current: usize, suggested: usize },
    DecreaseCapacity { current: usize, suggested: usize },
    IncreaseTtl { current_secs: u64, suggested_secs: u64 },
}

impl CacheRecommendation {
    pub fn impact(&self) -> Impact {
        match self {
            CacheRecommendation::PrioritizeCaching { .. } => Impact::High,
            CacheRecommendation::OptimizeTransformation { .. }
            | CacheRecommendation::IncreaseCapacity { .. }
            | CacheRecommendation::IncreaseTtl { .. } => Impact::Medium,
            CacheRecommendation::SkipCaching { .. } | CacheRecommendation::DecreaseCapacity { .. } => Impact::Low,
        }
    }

    /// Transformation the recommendation is about, if any
    pub fn transformation_id(&self) -> Option<&str> {
        match self {
            CacheRecommendation::PrioritizeCaching { transformation_id, .. }
            | CacheRecommendation::SkipCaching { transformation_id, .. }
            | CacheRecommendation::OptimizeTransformation { transformation_id, .. } => Some(transformation_id),
            _ => None,
        }
    }
}

impl fmt::Display for CacheRecommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheRecommendation::PrioritizeCaching {
                transformation_id,
                improvement_pct,
            } => write!(
                f,
                "'{transformation_id}' is {improvement_pct:.1}% faster with the cache; keep its results cached"
            ),
            CacheRecommendation::SkipCaching {
                transformation_id,
                improvement_pct,
            } => write!(
                f,
                "'{transformation_id}' gains only {improvement_pct:.1}% from the cache; caching it can be skipped"
            ),
            CacheRecommendation::OptimizeTransformation {
                transformation_id,
                uncached_avg_micros,
            } => write!(
                f,
                "'{transformation_id}' takes {uncached_avg_micros:.0}µs per call uncached; consider a cheaper implementation"
            ),
            CacheRecommendation::IncreaseCapacity { current, suggested } => write!(
                f,
                "cache is nearly full with a low hit rate; raise capacity from {current} to {suggested}"
            ),
            CacheRecommendation::DecreaseCapacity { current, suggested } => write!(
                f,
                "cache hits almost always while using under half its capacity; lower capacity from {current} to {suggested}"
            ),
            CacheRecommendation::IncreaseTtl {
                current_secs,
                suggested_secs,
            } => write!(
                f,
                "hit rate is very low; keep entries longer by raising the TTL from {current_secs}s to {suggested_secs}s"
            ),
        }
    }
}

/// Figures for one benchmarked transformation
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformationAnalysis {
    pub transformation_id: String,
    pub uncached_avg_micros: f64,
    pub cached_avg_micros: f64,
    pub improvement_pct: f64,
    /// Share of cached-pass lookups served from the cache
    pub cache_efficiency: f64,
    /// `improvement_pct * cache_efficiency`; higher means caching pays off more
    pub benefit_score: f64,
}

/// Outcome of [`analyze`]
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizationReport {
    /// Sorted by improvement, best first
    pub transformations: Vec<TransformationAnalysis>,
    pub average_improvement_pct: f64,
    /// Counters summed over every cached pass; `size` is the largest cache
    pub cache: CacheStats,
    pub recommendations: Vec<CacheRecommendation>,
}

impl OptimizationReport {
    pub fn best(&self) -> Option<&TransformationAnalysis> {
        self.transformations.first()
    }

    pub fn worst(&self) -> Option<&TransformationAnalysis> {
        self.transformations.last()
    }

    /// Apply the capacity and TTL recommendations to `config`
    ///
    /// Recommendations about single transformations leave it unchanged.
    pub fn tuned_config(&self, config: &CacheConfig) -> CacheConfig {
        let mut tuned = config.clone();
        for recommendation in &self.recommendations {
            match *recommendation {
                CacheRecommendation::IncreaseCapacity { suggested, .. }
                | CacheRecommendation::DecreaseCapacity { suggested, .. } => tuned.max_entries = suggested,
                CacheRecommendation::IncreaseTtl { suggested_secs, .. } => {
                    tuned.ttl = Duration::from_secs(suggested_secs)
                }
                _ => {}
            }
        }
        tuned
    }
}

fn combined_stats(results: &[BenchmarkResult], capacity: usize) -> CacheStats {
    let mut combined = CacheStats {
        size: 0,
        capacity,
        hit_count: 0,
        miss_count: 0,
        hit_rate: 0.0,
        evictions: 0,
        expirations: 0,
    };
    for stats in results.iter().map(|r| &r.cache_stats) {
        combined.size = combined.size.max(stats.size);
        combined.hit_count += stats.hit_count;
        combined.miss_count += stats.miss_count;
        combined.evictions += stats.evictions;
        combined.expirations += stats.expirations;
    }
    let lookups = combined.hit_count + combined.miss_count;
    if lookups > 0 {
        combined.hit_rate = combined.hit_count as f64 / lookups as f64;
    }
    combined
}

fn analyze_one(result: &BenchmarkResult) -> TransformationAnalysis {
    let cache_efficiency = result.cache_stats.hit_rate;
    TransformationAnalysis {
        transformation_id: result.transformation_id.clone(),
        uncached_avg_micros: result.uncached_avg_micros,
        cached_avg_micros: result.cached_avg_micros,
        improvement_pct: result.improvement_pct,
        cache_efficiency,
        benefit_score: result.improvement_pct * cache_efficiency,
    }
}

/// Derive recommendations from benchmark results run under `config`
///
/// Cache-wide recommendations need at least one lookup; an idle cache has
/// nothing to say about its sizing.
pub fn analyze(results: &[BenchmarkResult], config: &CacheConfig) -> OptimizationReport {
    let mut transformations: Vec<TransformationAnalysis> = results.iter().map(analyze_one).collect();
    transformations.sort_by(|a, b| b.improvement_pct.total_cmp(&a.improvement_pct));

    let average_improvement_pct = if transformations.is_empty() {
        0.0
    } else {
        transformations.iter().map(|t| t.improvement_pct).sum::<f64>() / transformations.len() as f64
    };

    let mut recommendations = Vec::new();
    for t in &transformations {
        if t.improvement_pct > PRIORITIZE_CACHING_PCT {
            recommendations.push(CacheRecommendation::PrioritizeCaching {
                transformation_id: t.transformation_id.clone(),
                improvement_pct: t.improvement_pct,
            });
        } else if t.improvement_pct < SKIP_CACHING_PCT {
            recommendations.push(CacheRecommendation::SkipCaching {
                transformation_id: t.transformation_id.clone(),
                improvement_pct: t.improvement_pct,
            });
        }
        if t.uncached_avg_micros > SLOW_TRANSFORMATION_MICROS && t.cache_efficiency < 0.7 {
            recommendations.push(CacheRecommendation::OptimizeTransformation {
                transformation_id: t.transformation_id.clone(),
                uncached_avg_micros: t.uncached_avg_micros,
            });
        }
    }

    let cache = combined_stats(results, config.max_entries);
    if cache.hit_count + cache.miss_count > 0 {
        let capacity = config.max_entries;
        let ttl_secs = config.ttl.as_secs();
        if cache.hit_rate < 0.5 && cache.size as f64 >= capacity as f64 * 0.9 {
            recommendations.push(CacheRecommendation::IncreaseCapacity {
                current: capacity,
                suggested: capacity.saturating_mul(3) / 2,
            });
        }
        if cache.hit_rate < 0.3 {
            recommendations.push(CacheRecommendation::IncreaseTtl {
                current_secs: ttl_secs,
                suggested_secs: ttl_secs.saturating_mul(2).max(1),
            });
        }
        if cache.hit_rate > 0.9 && (cache.size as f64) < capacity as f64 * 0.5 {
            let suggested = (cache.size * 3 / 2).max(MIN_SUGGESTED_CAPACITY);
            if suggested < capacity {
                recommendations.push(CacheRecommendation::DecreaseCapacity {
                    current: capacity,
                    suggested,
                });
            }
        }
    }

    OptimizationReport {
        transformations,
        average_improvement_pct,
        cache,
        recommendations,
    }
}

/// Analyze `results` against the engine's current cache settings and apply
/// the capacity and TTL recommendations
///
/// Returns the report and the configuration now in effect.
pub fn auto_optimize(engine: &MappingEngine, results: &[BenchmarkResult]) -> (OptimizationReport, CacheConfig) {
    let current = engine.cache_config();
    let report = analyze(results, &current);
    let tuned = report.tuned_config(&current);
    if tuned != current {
        info!(
            max_entries = tuned.max_entries,
            ttl_secs = tuned.ttl.as_secs(),
            previous_max_entries = current.max_entries,
            previous_ttl_secs = current.ttl.as_secs(),
            "Applied cache recommendations"
        );
        engine.update_cache_config(tuned.clone());
    }
    (report, tuned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::benchmark::{generate_samples, run_benchmark};
    use crate::types::{SourceFieldType, TargetFieldType};

    fn stats(size: usize, capacity: usize, hits: u64, misses: u64) -> CacheStats {
        CacheStats {
            size,
            capacity,
            hit_count: hits,
            miss_count: misses,
            hit_rate: if hits + misses == 0 {
                0.0
            } else {
                hits as f64 / (hits + misses) as f64
            },
            evictions: 0,
            expirations: 0,
        }
    }

    fn result(id: &str, uncached: f64, cached: f64, cache_stats: CacheStats) -> BenchmarkResult {
        BenchmarkResult {
            transformation_id: id.to_string(),
            source_type: SourceFieldType::Number,
            target_type: TargetFieldType::String,
            samples: 10,
            iterations: 10,
            uncached_avg_micros: uncached,
            cached_avg_micros: cached,
            improvement_pct: (uncached - cached) / uncached * 100.0,
            cache_stats,
        }
    }

    fn config(max_entries: usize, ttl_secs: u64) -> CacheConfig {
        CacheConfig {
            max_entries,
            ttl: Duration::from_secs(ttl_secs),
            enabled: true,
        }
    }

    #[test]
    fn test_improvement_thresholds() {
        let results = vec![
            result("slow-and-cached", 10.0, 1.0, stats(10, 500, 90, 10)),
            result("middling", 10.0, 8.0, stats(10, 500, 90, 10)),
            result("cheap", 10.0, 9.8, stats(10, 500, 90, 10)),
        ];
        let report = analyze(&results, &config(500, 300));

        assert_eq!(report.best().unwrap().transformation_id, "slow-and-cached");
        assert_eq!(report.worst().unwrap().transformation_id, "cheap");
        let per_transformation: Vec<_> = report
            .recommendations
            .iter()
            .filter_map(|r| r.transformation_id().map(|id| (id, r.impact())))
            .collect();
        assert_eq!(
            per_transformation,
            vec![("slow-and-cached", Impact::High), ("cheap", Impact::Low)]
        );
        assert!((report.average_improvement_pct - 112.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_full_cache_with_low_hit_rate_grows() {
        let results = vec![result("a", 10.0, 9.0, stats(100, 100, 10, 90))];
        let report = analyze(&results, &config(100, 300));

        assert!(report.recommendations.contains(&CacheRecommendation::IncreaseCapacity {
            current: 100,
            suggested: 150
        }));
        assert!(report.recommendations.contains(&CacheRecommendation::IncreaseTtl {
            current_secs: 300,
            suggested_secs: 600
        }));
        let tuned = report.tuned_config(&config(100, 300));
        assert_eq!(tuned.max_entries, 150);
        assert_eq!(tuned.ttl, Duration::from_secs(600));
    }

    #[test]
    fn test_underused_cache_shrinks_but_not_below_floor() {
        let report = analyze(&[result("a", 10.0, 1.0, stats(20, 500, 990, 10))], &config(500, 300));
        assert!(report.recommendations.contains(&CacheRecommendation::DecreaseCapacity {
            current: 500,
            suggested: MIN_SUGGESTED_CAPACITY
        }));

        // Already at the floor: nothing to suggest
        let report = analyze(&[result("a", 10.0, 1.0, stats(20, 100, 990, 10))], &config(100, 300));
        assert!(!report
            .recommendations
            .iter()
            .any(|r| matches!(r, CacheRecommendation::DecreaseCapacity { .. })));
    }

    #[test]
    fn test_idle_cache_gets_no_sizing_advice() {
        let report = analyze(&[], &config(500, 300));
        assert!(report.recommendations.is_empty());
        assert_eq!(report.average_improvement_pct, 0.0);
        assert!(report.best().is_none());
    }

    #[test]
    fn test_slow_transformation_is_flagged() {
        let results = vec![result("heavy", 5_000.0, 4_900.0, stats(50, 500, 10, 40))];
        let report = analyze(&results, &config(500, 300));
        assert!(report
            .recommendations
            .iter()
            .any(|r| matches!(r, CacheRecommendation::OptimizeTransformation { .. })));
    }

    #[test]
    fn test_recommendations_serialize_with_type_tag() {
        let value = serde_json::to_value(CacheRecommendation::IncreaseTtl {
            current_secs: 300,
            suggested_secs: 600,
        })
        .unwrap();
        assert_eq!(value["type"], "increase_ttl");
        assert_eq!(value["suggestedSecs"], 600);
    }

    #[test]
    fn test_auto_optimize_grows_a_thrashing_cache() {
        let engine = MappingEngine::with_cache_config(config(8, 300)).unwrap();
        let samples = generate_samples(SourceFieldType::Number, 20);
        let results = vec![run_benchmark(&engine, "number-to-string", &samples, 5).unwrap()];

        let (report, applied) = auto_optimize(&engine, &results);
        assert_eq!(report.cache.hit_count, 0);
        assert_eq!(applied.max_entries, 12);
        assert_eq!(applied.ttl, Duration::from_secs(600));
        assert_eq!(engine.cache_config(), applied);
    }

    #[test]
    fn test_auto_optimize_leaves_a_healthy_cache_alone() {
        let engine = MappingEngine::with_cache_config(config(40, 300)).unwrap();
        let samples = generate_samples(SourceFieldType::Number, 20);
        let results = vec![run_benchmark(&engine, "number-to-string", &samples, 5).unwrap()];

        let (_, applied) = auto_optimize(&engine, &results);
        assert_eq!(applied, config(40, 300));
        assert_eq!(engine.cache_config(), config(40, 300));
    }
}
