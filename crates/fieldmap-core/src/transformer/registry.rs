//! Transformation registry
//!
//! The registry is assembled once through [`TransformationRegistryBuilder`] and
//! is read-only afterwards. Lookups by id go through a hash index; lookups by
//! type pair return transformations in registration order.
//!
//! Copyright (c) 2025 Fieldmap Team
//! Licensed under the Apache-2.0 license

use super::built_in;
use super::types::Transformation;
use crate::types::{SourceFieldType, TargetFieldType};
use crate::{Error, Result};
use std::collections::HashMap;
use tracing::debug;

/// Immutable catalog of transformations
#[derive(Debug, Clone)]
pub struct TransformationRegistry {
    transformations: Vec<Transformation>,
    index: HashMap<String, usize>,
}

impl TransformationRegistry {
    pub fn builder() -> TransformationRegistryBuilder {
        TransformationRegistryBuilder::default()
    }

    /// Registry holding the built-in catalog only
    pub fn with_built_ins() -> Result<Self> {
        Self::builder().with_built_ins().build()
    }

    pub fn get_transformation(&self, id: &str) -> Option<&Transformation> {
        self.index.get(id).map(|&i| &self.transformations[i])
    }

    /// Every transformation for the pair, in registration order
    pub fn find_transformations(
        &self,
        source: SourceFieldType,
        target: TargetFieldType,
    ) -> Vec<&Transformation> {
        self.transformations
            .iter()
            .filter(|t| t.converts(source, target))
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Transformation> {
        self.transformations.iter()
    }

    pub fn len(&self) -> usize {
        self.transformations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transformations.is_empty()
    }
}

/// Collects transformations and checks them before freezing the registry
#[derive(Default)]
pub struct TransformationRegistryBuilder {
    transformations: Vec<Transformation>,
}

impl TransformationRegistryBuilder {
    /// Add the built-in catalog
    pub fn with_built_ins(mut self) -> Self {
        self.transformations.extend(built_in::catalog());
        self
    }

    /// Add one transformation
    pub fn register(mut self, transformation: Transformation) -> Self {
        self.transformations.push(transformation);
        self
    }

    /// Freeze the registry, failing on an empty or duplicate id
    pub fn build(self) -> Result<TransformationRegistry> {
        let mut index = HashMap::with_capacity(self.transformations.len());
        for (i, transformation) in self.transformations.iter().enumerate() {
            if transformation.id.trim().is_empty() {
                return Err(Error::Configuration {
                    message: format!(
                        "transformation {} -> {} has an empty id",
                        transformation.source_type, transformation.target_type
                    ),
                    source: None,
                });
            }
            if index.insert(transformation.id.clone(), i).is_some() {
                return Err(Error::Configuration {
                    message: format!("duplicate transformation id '{}'", transformation.id),
                    source: None,
                });
            }
        }

        debug!(count = self.transformations.len(), "transformation registry built");
        Ok(TransformationRegistry {
            transformations: self.transformations,
            index,
        })
    }
}
