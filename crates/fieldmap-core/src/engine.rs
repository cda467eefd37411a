//! Engine facade
//!
//! [`MappingEngine`] bundles the read-only registry with one explicitly
//! constructed cache and exposes the operations callers need: compatibility
//! lookups, transformation discovery, cached execution, mapping validation and
//! cache statistics. It is `Send + Sync`; the cache sits behind a mutex.

use crate::cache::{CacheConfig, CacheStats, TransformationCache};
use crate::compatibility::get_compatibility_level;
use crate::error::MappingError;
use crate::transformer::{Transformation, TransformationRegistry};
use crate::types::{CompatibilityLevel, MappingSpec, SourceField, SourceFieldType, TargetField, TargetFieldType};
use crate::validator::{MappingValidator, ValidationMode, ValidationResult};
use crate::Result;
use serde_json::Value;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::debug;

/// Compatibility, transformation and validation entry point
#[derive(Debug)]
pub struct MappingEngine {
    registry: TransformationRegistry,
    cache: Mutex<TransformationCache>,
    validation_mode: ValidationMode,
}

impl MappingEngine {
    /// Engine over the built-in catalog with a default cache
    pub fn new() -> Result<Self> {
        Self::with_cache_config(CacheConfig::default())
    }

    /// Engine over the built-in catalog with a configured cache
    pub fn with_cache_config(config: CacheConfig) -> Result<Self> {
        Ok(Self::from_parts(
            TransformationRegistry::with_built_ins()?,
            TransformationCache::with_config(config),
        ))
    }

    pub fn from_parts(registry: TransformationRegistry, cache: TransformationCache) -> Self {
        Self {
            registry,
            cache: Mutex::new(cache),
            validation_mode: ValidationMode::Strict,
        }
    }

    pub fn with_validation_mode(mut self, mode: ValidationMode) -> Self {
        self.validation_mode = mode;
        self
    }

    pub fn registry(&self) -> &TransformationRegistry {
        &self.registry
    }

    fn lock_cache(&self) -> MutexGuard<'_, TransformationCache> {
        // Cache bookkeeping cannot be left half-updated by a panicking transformation
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn compatibility_level(&self, source: SourceFieldType, target: TargetFieldType) -> CompatibilityLevel {
        get_compatibility_level(source, target)
    }

    pub fn find_transformations(&self, source: SourceFieldType, target: TargetFieldType) -> Vec<&Transformation> {
        self.registry.find_transformations(source, target)
    }

    pub fn get_transformation(&self, id: &str) -> Option<&Transformation> {
        self.registry.get_transformation(id)
    }

    /// Run a transformation by id, serving repeated inputs from the cache
    pub fn get_or_compute(&self, transformation_id: &str, value: &Value) -> std::result::Result<Value, MappingError> {
        let transformation = self.registry.get_transformation(transformation_id).ok_or_else(|| {
            debug!(transformation = %transformation_id, "unknown transformation requested");
            MappingError::TransformationNotFound {
                transformation_id: Some(transformation_id.to_string()),
            }
        })?;
        self.lock_cache()
            .get_or_compute(transformation, value)
            .map_err(MappingError::from)
    }

    /// A validator sharing this engine's registry, cache and mode
    pub fn validator(&self) -> MappingValidator<'_> {
        MappingValidator::new(&self.registry)
            .with_cache(&self.cache)
            .with_mode(self.validation_mode)
    }

    pub fn validate_mapping(
        &self,
        source: &SourceField,
        target: &TargetField,
        transformation_id: Option<&str>,
    ) -> ValidationResult {
        self.validator().validate_mapping(source, target, transformation_id)
    }

    pub fn validate_mapping_with_sample(
        &self,
        source: &SourceField,
        target: &TargetField,
        transformation_id: Option<&str>,
        sample: &Value,
    ) -> ValidationResult {
        self.validator()
            .validate_mapping_with_sample(source, target, transformation_id, sample)
    }

    pub fn validate_all(
        &self,
        sources: &[SourceField],
        targets: &[TargetField],
        mappings: &[MappingSpec],
    ) -> Result<Vec<ValidationResult>> {
        self.validator().validate_all(sources, targets, mappings)
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.lock_cache().stats()
    }

    /// Drop every cached result and reset counters
    pub fn clear_cache(&self) {
        self.lock_cache().clear();
    }

    pub fn cache_config(&self) -> CacheConfig {
        self.lock_cache().config().clone()
    }

    pub fn update_cache_config(&self, config: CacheConfig) {
        self.lock_cache().update_config(config);
    }

    pub fn invalidate_transformation(&self, transformation_id: &str) -> usize {
        self.lock_cache().invalidate_transformation(transformation_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Arc;
    use std::thread;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn test_engine_is_send_and_sync() {
        assert_send_sync::<MappingEngine>();
    }

    #[test]
    fn test_unknown_id_is_not_found_even_for_null() {
        let engine = MappingEngine::new().unwrap();
        let err = engine.get_or_compute("missing", &Value::Null).unwrap_err();
        assert_eq!(
            err,
            MappingError::TransformationNotFound {
                transformation_id: Some("missing".to_string())
            }
        );
    }

    #[test]
    fn test_execution_errors_are_structured() {
        let engine = MappingEngine::new().unwrap();
        let err = engine
            .get_or_compute("multiSelect-to-tags", &json!({"name": "solo"}))
            .unwrap_err();
        assert_eq!(err.kind(), "transformationExecution");
        assert!(err.is_retryable());
    }

    #[test]
    fn test_validation_example_run_warms_the_shared_cache() {
        let engine = MappingEngine::new().unwrap();
        let source = SourceField::new("body", "Body", SourceFieldType::RichText);
        let target = TargetField::new("summary", "Summary", TargetFieldType::String);
        assert!(engine.validate_mapping(&source, &target, Some("richText-to-plain")).is_valid);

        let example = json!([{"plain_text": "Hello "}, {"plain_text": "World"}]);
        assert_eq!(
            engine.get_or_compute("richText-to-plain", &example).unwrap(),
            json!("Hello World")
        );
        assert_eq!(engine.cache_stats().hit_count, 1);
    }

    #[test]
    fn test_concurrent_callers_share_one_cache() {
        let engine = Arc::new(MappingEngine::new().unwrap());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let engine = Arc::clone(&engine);
                thread::spawn(move || {
                    for n in 0..25 {
                        engine.get_or_compute("number-to-string", &json!(n)).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        let stats = engine.cache_stats();
        assert_eq!(stats.size, 25);
        assert_eq!(stats.hit_count + stats.miss_count, 100);
        assert!(stats.miss_count >= 25);
    }

    #[test]
    fn test_update_cache_config_and_clear() {
        let engine = MappingEngine::new().unwrap();
        for n in 0..5 {
            engine.get_or_compute("number-to-string", &json!(n)).unwrap();
        }
        engine.update_cache_config(CacheConfig {
            max_entries: 2,
            ..CacheConfig::default()
        });
        assert_eq!(engine.cache_stats().size, 2);
        assert_eq!(engine.cache_config().max_entries, 2);
        assert_eq!(engine.invalidate_transformation("number-to-string"), 2);
        engine.clear_cache();
        assert_eq!(engine.cache_stats().miss_count, 0);
    }
}
