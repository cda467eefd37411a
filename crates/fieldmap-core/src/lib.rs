//! Fieldmap Core - compatibility and transformation engine for Notion field mapping
//!
//! This crate decides whether a Notion database property can populate a website
//! content field, converts values between the two, and memoizes conversions.
//!
//! # Main Components
//!
//! - **Type Registry**: closed source and target field type enumerations ([`types`])
//! - **Compatibility Matrix**: total lookup from a type pair to a level ([`compatibility`])
//! - **Transformation Registry**: catalog of named, pure conversions ([`transformer`])
//! - **Transformation Cache**: bounded, TTL-aware memo of results ([`cache`])
//! - **Mapping Validator**: accept or reject a proposed mapping ([`validator`])
//!
//! On top of these sit the [`MappingEngine`] facade, the [`MappingSession`] that
//! keeps mapping validity current, the record [`MappingPipeline`], configuration
//! export, and benchmarking with cache tuning ([`optimization`]).
//!
//! # Example
//!
//! ```
//! use fieldmap_core::{MappingEngine, SourceField, SourceFieldType, TargetField, TargetFieldType};
//! use serde_json::json;
//!
//! let engine = MappingEngine::new().unwrap();
//! let source = SourceField::new("body", "Body", SourceFieldType::RichText);
//! let target = TargetField::new("summary", "Summary", TargetFieldType::String);
//!
//! let result = engine.validate_mapping(&source, &target, Some("richText-to-plain"));
//! assert!(result.is_valid);
//!
//! let value = engine
//!     .get_or_compute("richText-to-plain", &json!([{"plain_text": "Hello "}, {"plain_text": "World"}]))
//!     .unwrap();
//! assert_eq!(value, json!("Hello World"));
//! ```

pub mod benchmark;
pub mod cache;
pub mod compatibility;
pub mod engine;
pub mod error;
pub mod export;
pub mod optimization;
pub mod pipeline;
pub mod session;
pub mod transformer;
pub mod types;
pub mod validator;

// Re-export main types for convenience
pub use cache::{CacheConfig, CacheStats, Clock, ManualClock, SystemClock, TransformationCache};
pub use compatibility::{compatible_targets, get_compatibility_level, recommend_sources, Recommendations};
pub use engine::MappingEngine;
pub use error::{Error, MappingError, Result};
pub use export::{ExportData, MappingConfig, MappingValidation};
pub use optimization::{CacheRecommendation, OptimizationReport};
pub use pipeline::{BatchOutcome, FieldFailure, MappingPipeline, RecordOutcome};
pub use session::{FieldMapping, MappingSession};
pub use transformer::{Transformation, TransformationError, TransformationRegistry, ValueError};
pub use types::{
    CompatibilityLevel, Field, FieldOrigin, MappingSpec, PerformanceImpact, SourceField,
    SourceFieldType, TargetField, TargetFieldType,
};
pub use validator::{MappingValidator, SampleOutcome, ValidationMode, ValidationResult};
