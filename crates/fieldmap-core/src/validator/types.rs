//! Validation result types
//!
//! Copyright (c) 2025 Fieldmap Team
//! Licensed under the Apache-2.0 license

use crate::error::MappingError;
use crate::types::CompatibilityLevel;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Whether accepted transformations are run against their declared example
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValidationMode {
    /// Run the example through the transformation and reject on failure
    #[default]
    Strict,
    /// Accept on type checks alone
    Lenient,
}

/// What happened when a caller-supplied sample went through an accepted mapping
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SampleOutcome {
    pub input: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<MappingError>,
}

/// Outcome of validating one proposed mapping
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub is_valid: bool,
    pub compatibility_level: CompatibilityLevel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transformation_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<MappingError>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample: Option<SampleOutcome>,
}

impl ValidationResult {
    pub fn accepted(level: CompatibilityLevel, transformation_id: Option<String>) -> Self {
        Self {
            is_valid: true,
            compatibility_level: level,
            transformation_id,
            error: None,
            suggestion: None,
            sample: None,
        }
    }

    pub fn rejected(level: CompatibilityLevel, error: MappingError) -> Self {
        Self {
            is_valid: false,
            compatibility_level: level,
            transformation_id: None,
            error: Some(error),
            suggestion: None,
            sample: None,
        }
    }

    pub fn with_suggestion(mut self, suggestion: Option<String>) -> Self {
        self.suggestion = suggestion;
        self
    }

    /// Accepted without a transformation
    pub fn is_direct(&self) -> bool {
        self.is_valid && self.transformation_id.is_none()
    }

    /// The rejection reason as display text
    pub fn error_message(&self) -> Option<String> {
        self.error.as_ref().map(ToString::to_string)
    }

    /// Whether the attached sample failed to transform
    pub fn sample_failed(&self) -> bool {
        self.sample.as_ref().is_some_and(|s| s.error.is_some())
    }
}
