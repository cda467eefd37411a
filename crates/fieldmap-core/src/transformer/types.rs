//! Core types for the transformation catalog
//!
//! Copyright (c) 2025 Fieldmap Team
//! Licensed under the Apache-2.0 license

use crate::types::{PerformanceImpact, SourceFieldType, TargetFieldType};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// Signature shared by every transformation body
///
/// Bodies are plain function pointers, so they cannot capture state and stay
/// pure functions of their input.
pub type ApplyFn = fn(&Value) -> std::result::Result<Value, ValueError>;

/// Why a transformation body rejected a value
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValueError {
    /// The JSON shape does not match the declared source type
    #[error("expected {expected}, found {found}")]
    UnexpectedShape {
        expected: &'static str,
        found: &'static str,
    },

    /// Right shape, unusable content
    #[error("{message}")]
    InvalidValue { message: String },
}

impl ValueError {
    pub fn shape(expected: &'static str, value: &Value) -> Self {
        ValueError::UnexpectedShape {
            expected,
            found: shape_name(value),
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        ValueError::InvalidValue {
            message: message.into(),
        }
    }
}

/// JSON kind of a value, for error messages
pub fn shape_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// A transformation failed on a concrete value
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("transformation '{transformation_id}' failed: {reason}")]
pub struct TransformationError {
    pub transformation_id: String,
    #[source]
    pub reason: ValueError,
}

/// Declared input and output used to document and self-check a transformation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransformationExample {
    pub source: Value,
    pub target: Value,
}

/// A named, pure conversion from one source type to one target type
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Transformation {
    pub id: String,
    pub name: String,
    pub description: String,
    pub source_type: SourceFieldType,
    pub target_type: TargetFieldType,
    pub performance_impact: PerformanceImpact,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<TransformationExample>,
    #[serde(skip)]
    pub(crate) apply_fn: ApplyFn,
}

impl Transformation {
    /// Run the transformation on one value
    ///
    /// Null input short-circuits to null without running the body.
    pub fn apply(&self, value: &Value) -> std::result::Result<Value, TransformationError> {
        if value.is_null() {
            return Ok(Value::Null);
        }
        (self.apply_fn)(value).map_err(|reason| TransformationError {
            transformation_id: self.id.clone(),
            reason,
        })
    }

    /// Whether this transformation converts exactly `source` to `target`
    pub fn converts(&self, source: SourceFieldType, target: TargetFieldType) -> bool {
        self.source_type == source && self.target_type == target
    }
}
