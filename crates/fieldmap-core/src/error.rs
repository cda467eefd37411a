//! Error types for the fieldmap core library
//!
//! Two layers live here. [`MappingError`] is the structured taxonomy handed back
//! to callers of the engine as data (it is serializable and never thrown across
//! the public boundary). [`Error`] is the crate-wide error used by fallible
//! construction, configuration and persistence paths.

use crate::transformer::TransformationError;
use crate::types::{SourceFieldType, TargetFieldType};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for fieldmap operations
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid engine or registry configuration
    #[error("Configuration error: {message}")]
    Configuration {
        message: String,
        #[source]
        source: Option<anyhow::Error>,
    },

    /// Validation errors for inputs
    #[error("Validation error: {field} - {message}")]
    Validation {
        field: String,
        message: String,
        expected: Option<String>,
    },

    /// A mapping was rejected
    #[error("Mapping error: {0}")]
    Mapping(#[from] MappingError),

    /// A transformation failed on a concrete value
    #[error("Transformation error: {0}")]
    Transformation(#[from] TransformationError),

    /// JSON parsing and serialization errors
    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: serde_json::Error,
    },

    /// IO errors
    #[error("IO error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Generic internal error with context
    #[error("Internal error: {message}")]
    Internal {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

/// Convenience type alias for Results using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Why a proposed mapping or a cached transformation call did not succeed
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum MappingError {
    /// The compatibility level of the pair is `NONE`
    #[error("incompatible types: cannot map {source_type} to {target_type}")]
    #[serde(rename_all = "camelCase")]
    IncompatibleTypes {
        source_type: SourceFieldType,
        target_type: TargetFieldType,
    },

    /// The referenced transformation is not registered, or a required one was not supplied
    #[error("transformation not found: {}", .transformation_id.as_deref().unwrap_or("none supplied"))]
    #[serde(rename_all = "camelCase")]
    TransformationNotFound { transformation_id: Option<String> },

    /// The transformation exists but converts a different pair of types
    #[error(
        "transformation type mismatch: '{transformation_id}' converts {declared_source} to {declared_target}, not {source_type} to {target_type}"
    )]
    #[serde(rename_all = "camelCase")]
    TransformationTypeMismatch {
        transformation_id: String,
        declared_source: SourceFieldType,
        declared_target: TargetFieldType,
        source_type: SourceFieldType,
        target_type: TargetFieldType,
    },

    /// `apply` failed on a concrete value
    #[error("transformation '{transformation_id}' failed: {reason}")]
    #[serde(rename_all = "camelCase")]
    TransformationExecution {
        transformation_id: String,
        reason: String,
    },
}

impl MappingError {
    /// Stable name of the error kind, matching the serialized `kind` tag
    pub fn kind(&self) -> &'static str {
        match self {
            MappingError::IncompatibleTypes { .. } => "incompatibleTypes",
            MappingError::TransformationNotFound { .. } => "transformationNotFound",
            MappingError::TransformationTypeMismatch { .. } => "transformationTypeMismatch",
            MappingError::TransformationExecution { .. } => "transformationExecution",
        }
    }

    /// Only execution failures can go away with a different input value
    pub fn is_retryable(&self) -> bool {
        matches!(self, MappingError::TransformationExecution { .. })
    }
}

impl From<TransformationError> for MappingError {
    fn from(err: TransformationError) -> Self {
        MappingError::TransformationExecution {
            transformation_id: err.transformation_id,
            reason: err.reason.to_string(),
        }
    }
}

// Conversion implementations
impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Json {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Error::Internal {
            message: err.to_string(),
            source: err,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transformer::ValueError;

    #[test]
    fn test_error_display() {
        let err = Error::Configuration {
            message: "duplicate transformation id 'x'".to_string(),
            source: None,
        };
        assert_eq!(
            err.to_string(),
            "Configuration error: duplicate transformation id 'x'"
        );
    }

    #[test]
    fn test_not_found_display() {
        let missing = MappingError::TransformationNotFound {
            transformation_id: Some("nope".to_string()),
        };
        assert_eq!(missing.to_string(), "transformation not found: nope");

        let absent = MappingError::TransformationNotFound {
            transformation_id: None,
        };
        assert_eq!(absent.to_string(), "transformation not found: none supplied");
    }

    #[test]
    fn test_mapping_error_serializes_with_kind_tag() {
        let err = MappingError::IncompatibleTypes {
            source_type: SourceFieldType::Files,
            target_type: TargetFieldType::Boolean,
        };
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["kind"], "incompatibleTypes");
        assert_eq!(json["sourceType"], "files");
        assert_eq!(json["targetType"], "boolean");
        assert_eq!(json["kind"], err.kind());

        let back: MappingError = serde_json::from_value(json).unwrap();
        assert_eq!(back, err);
    }

    #[test]
    fn test_execution_error_from_transformation_error() {
        let err = TransformationError {
            transformation_id: "multiSelect-to-tags".to_string(),
            reason: ValueError::UnexpectedShape {
                expected: "array",
                found: "string",
            },
        };
        let mapped = MappingError::from(err);
        assert!(mapped.is_retryable());
        assert_eq!(
            mapped.to_string(),
            "transformation 'multiSelect-to-tags' failed: expected array, found string"
        );
    }

    #[test]
    fn test_only_execution_is_retryable() {
        let err = MappingError::TransformationNotFound {
            transformation_id: None,
        };
        assert!(!err.is_retryable());
    }
}
