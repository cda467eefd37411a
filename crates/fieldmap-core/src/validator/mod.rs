//! Validation of proposed field mappings
//!
//! A mapping is checked in a fixed order: the compatibility level of the type
//! pair, then whether a transformation is required, then the transformation's
//! existence and declared types, and finally (in strict mode) a trial run of its
//! example so transformation failures show up while the mapping is being set up.
//!
//! - `types`: Result, sample and mode types
//! - `core`: The `MappingValidator` itself
//! - `tests`: Test suite
//!
//! Copyright (c) 2025 Fieldmap Team
//! Licensed under the Apache-2.0 license

pub mod core;
pub mod types;


// Re-export public API
pub use self::core::MappingValidator;
pub use types::{SampleOutcome, ValidationMode, ValidationResult};
