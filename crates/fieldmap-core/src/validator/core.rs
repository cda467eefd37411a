//! Mapping validator
//!
//! Copyright (c) 2025 Fieldmap Team
//! Licensed under the Apache-2.0 license

use super::{SampleOutcome, ValidationMode, ValidationResult};
use crate::cache::TransformationCache;
use crate::compatibility::{compatible_targets, get_compatibility_level};
use crate::error::MappingError;
use crate::transformer::{Transformation, TransformationError, TransformationRegistry};
use crate::types::{CompatibilityLevel, MappingSpec, SourceField, SourceFieldType, TargetField, TargetFieldType};
use crate::{Error, Result};
use serde_json::Value;
use std::sync::{Mutex, PoisonError};
use tracing::debug;

/// Accepts or rejects proposed `source -> target` mappings
///
/// Consults the compatibility matrix first and the transformation registry
/// second. When a cache is attached, example and sample runs go through it.
pub struct MappingValidator<'a> {
    registry: &'a TransformationRegistry,
    cache: Option<&'a Mutex<TransformationCache>>,
    validation_mode: ValidationMode,
}

impl<'a> MappingValidator<'a> {
    /// Create a validator in strict mode without a cache
    pub fn new(registry: &'a TransformationRegistry) -> Self {
        Self {
            registry,
            cache: None,
            validation_mode: ValidationMode::Strict,
        }
    }

    pub fn with_mode(mut self, mode: ValidationMode) -> Self {
        self.validation_mode = mode;
        self
    }

    pub fn with_cache(mut self, cache: &'a Mutex<TransformationCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Validate one proposed mapping
    pub fn validate_mapping(
        &self,
        source: &SourceField,
        target: &TargetField,
        transformation_id: Option<&str>,
    ) -> ValidationResult {
        let (source_type, target_type) = (source.field_type, target.field_type);
        let level = get_compatibility_level(source_type, target_type);

        if level == CompatibilityLevel::None {
            debug!(source = %source.id, target = %target.id, "rejected incompatible mapping");
            return ValidationResult::rejected(
                level,
                MappingError::IncompatibleTypes {
                    source_type,
                    target_type,
                },
            )
            .with_suggestion(self.suggest_targets(source_type));
        }

        let Some(id) = transformation_id else {
            if level.is_direct() {
                return ValidationResult::accepted(level, None);
            }
            return ValidationResult::rejected(
                level,
                MappingError::TransformationNotFound {
                    transformation_id: None,
                },
            )
            .with_suggestion(self.suggest_transformations(source_type, target_type));
        };

        let Some(transformation) = self.registry.get_transformation(id) else {
            return ValidationResult::rejected(
                level,
                MappingError::TransformationNotFound {
                    transformation_id: Some(id.to_string()),
                },
            )
            .with_suggestion(self.suggest_transformations(source_type, target_type));
        };

        if !transformation.converts(source_type, target_type) {
            return ValidationResult::rejected(
                level,
                MappingError::TransformationTypeMismatch {
                    transformation_id: id.to_string(),
                    declared_source: transformation.source_type,
                    declared_target: transformation.target_type,
                    source_type,
                    target_type,
                },
            )
            .with_suggestion(self.suggest_transformations(source_type, target_type));
        }

        if let Err(err) = self.check_example(transformation) {
            debug!(transformation = %id, error = %err, "transformation failed its example");
            return ValidationResult::rejected(level, err.into());
        }

        ValidationResult::accepted(level, Some(id.to_string()))
    }

    /// Validate, then push `sample` through the accepted mapping
    ///
    /// A sample failure is attached to the result without invalidating the
    /// mapping; the problem lies with that value, not with the configuration.
    pub fn validate_mapping_with_sample(
        &self,
        source: &SourceField,
        target: &TargetField,
        transformation_id: Option<&str>,
        sample: &Value,
    ) -> ValidationResult {
        let mut result = self.validate_mapping(source, target, transformation_id);
        if !result.is_valid {
            return result;
        }

        let outcome = match result
            .transformation_id
            .as_deref()
            .and_then(|id| self.registry.get_transformation(id))
        {
            None => SampleOutcome {
                input: sample.clone(),
                output: Some(sample.clone()),
                error: None,
            },
            Some(transformation) => match self.run(transformation, sample) {
                Ok(output) => SampleOutcome {
                    input: sample.clone(),
                    output: Some(output),
                    error: None,
                },
                Err(err) => SampleOutcome {
                    input: sample.clone(),
                    output: None,
                    error: Some(err.into()),
                },
            },
        };
        result.sample = Some(outcome);
        result
    }

    /// Validate every mapping of a configuration, in order
    ///
    /// Mappings that reference unknown fields are a configuration error.
    pub fn validate_all(
        &self,
        sources: &[SourceField],
        targets: &[TargetField],
        mappings: &[MappingSpec],
    ) -> Result<Vec<ValidationResult>> {
        mappings
            .iter()
            .enumerate()
            .map(|(i, mapping)| {
                let source = sources
                    .iter()
                    .find(|f| f.id == mapping.source_field_id)
                    .ok_or_else(|| Error::Validation {
                        field: format!("mappings[{i}].source_field_id"),
                        message: format!("unknown source field '{}'", mapping.source_field_id),
                        expected: None,
                    })?;
                let target = targets
                    .iter()
                    .find(|f| f.id == mapping.target_field_id)
                    .ok_or_else(|| Error::Validation {
                        field: format!("mappings[{i}].target_field_id"),
                        message: format!("unknown target field '{}'", mapping.target_field_id),
                        expected: None,
                    })?;
                Ok(self.validate_mapping(source, target, mapping.transformation_id.as_deref()))
            })
            .collect()
    }

    fn check_example(&self, transformation: &Transformation) -> std::result::Result<(), TransformationError> {
        if self.validation_mode == ValidationMode::Lenient {
            return Ok(());
        }
        match &transformation.example {
            Some(example) => self.run(transformation, &example.source).map(|_| ()),
            None => Ok(()),
        }
    }

    fn run(
        &self,
        transformation: &Transformation,
        value: &Value,
    ) -> std::result::Result<Value, TransformationError> {
        match self.cache {
            Some(cache) => cache
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .get_or_compute(transformation, value),
            None => transformation.apply(value),
        }
    }

    fn suggest_transformations(
        &self,
        source_type: SourceFieldType,
        target_type: TargetFieldType,
    ) -> Option<String> {
        let ids: Vec<_> = self
            .registry
            .find_transformations(source_type, target_type)
            .into_iter()
            .map(|t| t.id.as_str())
            .collect();
        if ids.is_empty() {
            return None;
        }
        Some(format!("use one of: {}", ids.join(", ")))
    }

    fn suggest_targets(&self, source_type: SourceFieldType) -> Option<String> {
        let targets: Vec<_> = compatible_targets(source_type)
            .into_iter()
            .take(3)
            .map(|(target, _)| target.as_str())
            .collect();
        if targets.is_empty() {
            return None;
        }
        Some(format!("{source_type} maps best to: {}", targets.join(", ")))
    }
}
