//! Transformation catalog for converting Notion property values into website field values
//!
//! A [`Transformation`] is a named, pure function between one source type and
//! one target type. The [`TransformationRegistry`] holds the catalog and answers
//! lookups by id or by type pair.
//!
//! # Module Organization
//!
//! - [`types`] - Transformation, error and example types
//! - [`builder`] - Fluent builder for defining transformations
//! - [`registry`] - Immutable registry and its builder
//! - [`built_in`] - The built-in catalog
//! - [`values`] - Readers for Notion property value shapes
//!
//! # Examples
//!
//! ```
//! use fieldmap_core::transformer::TransformationRegistry;
//! use fieldmap_core::{SourceFieldType, TargetFieldType};
//! use serde_json::json;
//!
//! let registry = TransformationRegistry::with_built_ins().unwrap();
//! let found = registry.find_transformations(SourceFieldType::RichText, TargetFieldType::String);
//! assert_eq!(found[0].id, "richText-to-plain");
//!
//! let plain = found[0]
//!     .apply(&json!([{"plain_text": "Hello "}, {"plain_text": "World"}]))
//!     .unwrap();
//! assert_eq!(plain, json!("Hello World"));
//! ```
//!
//! Copyright (c) 2025 Fieldmap Team
//! Licensed under the Apache-2.0 license

pub mod builder;
pub mod built_in;
pub mod registry;
pub mod types;
pub mod values;

mod tests;

// Re-export public API
pub use builder::TransformationBuilder;
pub use registry::{TransformationRegistry, TransformationRegistryBuilder};
pub use types::{
    shape_name, ApplyFn, Transformation, TransformationError, TransformationExample, ValueError,
};
