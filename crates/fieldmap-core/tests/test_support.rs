//! Shared helpers for integration tests

#![allow(dead_code)]

use fieldmap_core::{
    CacheConfig, ManualClock, MappingEngine, TransformationCache, TransformationRegistry,
};
use std::sync::Arc;
use std::time::Duration;

pub fn engine() -> MappingEngine {
    MappingEngine::new().expect("built-in registry")
}

/// Engine whose cache reads a clock the test controls
pub fn manual_engine(max_entries: usize, ttl: Duration) -> (MappingEngine, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new());
    let cache = TransformationCache::with_clock(
        CacheConfig {
            max_entries,
            ttl,
            enabled: true,
        },
        clock.clone(),
    );
    let registry = TransformationRegistry::with_built_ins().expect("built-in registry");
    (MappingEngine::from_parts(registry, cache), clock)
}
