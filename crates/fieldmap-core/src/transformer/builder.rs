//! Builder for defining transformations
//!
//! Copyright (c) 2025 Fieldmap Team
//! Licensed under the Apache-2.0 license

use super::types::{ApplyFn, Transformation, TransformationExample};
use crate::types::{PerformanceImpact, SourceFieldType, TargetFieldType};
use serde_json::Value;

/// Builder for creating transformations
pub struct TransformationBuilder {
    id: String,
    name: Option<String>,
    description: String,
    source_type: SourceFieldType,
    target_type: TargetFieldType,
    performance_impact: PerformanceImpact,
    example: Option<TransformationExample>,
    apply_fn: ApplyFn,
}

impl TransformationBuilder {
    /// Create a new builder for a `source_type -> target_type` transformation
    pub fn new(
        id: impl Into<String>,
        source_type: SourceFieldType,
        target_type: TargetFieldType,
        apply_fn: ApplyFn,
    ) -> Self {
        Self {
            id: id.into(),
            name: None,
            description: String::new(),
            source_type,
            target_type,
            performance_impact: PerformanceImpact::Low,
            example: None,
            apply_fn,
        }
    }

    /// Set the display name (defaults to the id)
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the description
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the performance impact hint
    pub fn performance_impact(mut self, impact: PerformanceImpact) -> Self {
        self.performance_impact = impact;
        self
    }

    /// Attach an example, used for documentation and as the validation check
    pub fn example(mut self, source: Value, target: Value) -> Self {
        self.example = Some(TransformationExample { source, target });
        self
    }

    /// Build the transformation
    pub fn build(self) -> Transformation {
        Transformation {
            name: self.name.unwrap_or_else(|| self.id.clone()),
            id: self.id,
            description: self.description,
            source_type: self.source_type,
            target_type: self.target_type,
            performance_impact: self.performance_impact,
            example: self.example,
            apply_fn: self.apply_fn,
        }
    }
}

impl Transformation {
    /// Start a [`TransformationBuilder`]
    pub fn builder(
        id: impl Into<String>,
        source_type: SourceFieldType,
        target_type: TargetFieldType,
        apply_fn: ApplyFn,
    ) -> TransformationBuilder {
        TransformationBuilder::new(id, source_type, target_type, apply_fn)
    }
}
