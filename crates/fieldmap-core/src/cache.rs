//! Memoization of transformation results
//!
//! Entries are keyed by transformation id and the canonical JSON text of the
//! input, with object keys sorted so equal values always produce the same key.
//! Two eviction rules run on every write: entries older than their
//! TTL are dropped, then least-recently-accessed entries are evicted until the
//! cache is back within capacity.

use crate::transformer::{Transformation, TransformationError};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};
use tracing::{debug, trace};

/// Default maximum number of entries
pub const DEFAULT_MAX_ENTRIES: usize = 500;

/// Default time-to-live of an entry
pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);

/// Source of the current time
pub trait Clock: Send + Sync + fmt::Debug {
    fn now(&self) -> Instant;
}

/// Wall clock backed by [`Instant::now`]
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Clock that only moves when told to
#[derive(Debug)]
pub struct ManualClock {
    origin: Instant,
    offset: Mutex<Duration>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            offset: Mutex::new(Duration::ZERO),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut offset = self.offset.lock().unwrap_or_else(PoisonError::into_inner);
        *offset += by;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        let offset = self.offset.lock().unwrap_or_else(PoisonError::into_inner);
        self.origin + *offset
    }
}

/// Configuration for cache behavior
#[derive(Debug, Clone, PartialEq)]
pub struct CacheConfig {
    /// Maximum cache size (number of entries)
    pub max_entries: usize,
    /// Entries older than this are treated as misses
    pub ttl: Duration,
    /// When disabled every call computes and counts as a miss
    pub enabled: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: DEFAULT_MAX_ENTRIES,
            ttl: DEFAULT_TTL,
            enabled: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    transformation_id: String,
    value: String,
}

impl CacheKey {
    fn new(transformation_id: &str, value: &Value) -> Self {
        Self {
            transformation_id: transformation_id.to_string(),
            value: canonicalize(value).to_string(),
        }
    }
}

fn canonicalize(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            Value::Object(
                keys.into_iter()
                    .map(|key| (key.clone(), canonicalize(&map[key])))
                    .collect(),
            )
        }
        Value::Array(items) => Value::Array(items.iter().map(canonicalize).collect()),
        other => other.clone(),
    }
}

/// One memoized transformation result
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub value: Value,
    pub created_at: Instant,
    pub last_accessed_at: Instant,
    /// Overrides the configured TTL for this entry
    pub ttl: Option<Duration>,
    // Monotonic, breaks ties between equal timestamps
    access_seq: u64,
}

impl CacheEntry {
    fn is_expired(&self, now: Instant, default_ttl: Duration) -> bool {
        now.saturating_duration_since(self.created_at) > self.ttl.unwrap_or(default_ttl)
    }
}

/// Point-in-time view of cache counters
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    pub size: usize,
    pub capacity: usize,
    pub hit_count: u64,
    pub miss_count: u64,
    /// `hit_count / (hit_count + miss_count)`, `0.0` before any lookup
    pub hit_rate: f64,
    pub evictions: u64,
    pub expirations: u64,
}

impl CacheStats {
    /// Fraction of capacity in use
    pub fn utilization(&self) -> f64 {
        if self.capacity == 0 {
            0.0
        } else {
            self.size as f64 / self.capacity as f64
        }
    }
}

/// Bounded, TTL-aware memo of `(transformation id, value) -> result`
#[derive(Debug)]
pub struct TransformationCache {
    entries: HashMap<CacheKey, CacheEntry>,
    config: CacheConfig,
    clock: Arc<dyn Clock>,
    sequence: u64,
    hits: u64,
    misses: u64,
    evictions: u64,
    expirations: u64,
}

impl TransformationCache {
    /// Create a cache with default configuration
    pub fn new() -> Self {
        Self::with_config(CacheConfig::default())
    }

    /// Create a cache with custom configuration
    pub fn with_config(config: CacheConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: CacheConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: HashMap::new(),
            config,
            clock,
            sequence: 0,
            hits: 0,
            misses: 0,
            evictions: 0,
            expirations: 0,
        }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Return the memoized result, or run the transformation and remember it
    ///
    /// Null input returns null without touching the cache or its counters.
    /// Failures are returned to the caller and never stored.
    pub fn get_or_compute(
        &mut self,
        transformation: &Transformation,
        value: &Value,
    ) -> Result<Value, TransformationError> {
        self.get_or_compute_with_ttl(transformation, value, None)
    }

    /// [`get_or_compute`](Self::get_or_compute) with a TTL for the stored
    /// entry; `None` uses the configured TTL
    ///
    /// A hit is served under the TTL the entry was stored with.
    pub fn get_or_compute_with_ttl(
        &mut self,
        transformation: &Transformation,
        value: &Value,
        ttl: Option<Duration>,
    ) -> Result<Value, TransformationError> {
        if value.is_null() {
            return Ok(Value::Null);
        }
        if !self.config.enabled {
            self.misses += 1;
            return transformation.apply(value);
        }

        let key = CacheKey::new(&transformation.id, value);
        let now = self.clock.now();
        if let Some(cached) = self.lookup(&key, now) {
            trace!(transformation = %transformation.id, "cache hit");
            return Ok(cached);
        }

        self.misses += 1;
        trace!(transformation = %transformation.id, "cache miss");
        let result = transformation.apply(value)?;
        self.insert(key, result.clone(), now, ttl);
        Ok(result)
    }

    fn lookup(&mut self, key: &CacheKey, now: Instant) -> Option<Value> {
        let ttl = self.config.ttl;
        let entry = self.entries.get_mut(key)?;
        if entry.is_expired(now, ttl) {
            self.entries.remove(key);
            self.expirations += 1;
            return None;
        }
        self.sequence += 1;
        entry.last_accessed_at = now;
        entry.access_seq = self.sequence;
        self.hits += 1;
        Some(entry.value.clone())
    }

    fn insert(&mut self, key: CacheKey, value: Value, now: Instant, ttl: Option<Duration>) {
        self.purge_expired_at(now);
        self.sequence += 1;
        self.entries.insert(
            key,
            CacheEntry {
                value,
                created_at: now,
                last_accessed_at: now,
                ttl,
                access_seq: self.sequence,
            },
        );
        self.enforce_capacity();
    }

    fn enforce_capacity(&mut self) {
        while self.entries.len() > self.config.max_entries {
            let Some(oldest) = self
                .entries
                .iter()
                .min_by_key(|(_, entry)| entry.access_seq)
                .map(|(key, _)| key.clone())
            else {
                break;
            };
            self.entries.remove(&oldest);
            self.evictions += 1;
            debug!(transformation = %oldest.transformation_id, "evicted least recently used cache entry");
        }
    }

    fn purge_expired_at(&mut self, now: Instant) -> usize {
        let ttl = self.config.ttl;
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired(now, ttl));
        let purged = before - self.entries.len();
        self.expirations += purged as u64;
        purged
    }

    /// Drop every expired entry now, returning how many were removed
    pub fn purge_expired(&mut self) -> usize {
        let now = self.clock.now();
        self.purge_expired_at(now)
    }

    /// Forget one memoized result
    pub fn invalidate(&mut self, transformation_id: &str, value: &Value) -> bool {
        self.entries
            .remove(&CacheKey::new(transformation_id, value))
            .is_some()
    }

    /// Forget every result of one transformation
    pub fn invalidate_transformation(&mut self, transformation_id: &str) -> usize {
        let before = self.entries.len();
        self.entries
            .retain(|key, _| key.transformation_id != transformation_id);
        before - self.entries.len()
    }

    /// Drop all entries and reset every counter
    pub fn clear(&mut self) {
        self.entries.clear();
        self.reset_stats();
    }

    pub fn reset_stats(&mut self) {
        self.hits = 0;
        self.misses = 0;
        self.evictions = 0;
        self.expirations = 0;
    }

    /// Apply new settings; a smaller capacity or TTL takes effect immediately
    pub fn update_config(&mut self, config: CacheConfig) {
        self.config = config;
        if !self.config.enabled {
            self.entries.clear();
            return;
        }
        self.purge_expired();
        self.enforce_capacity();
    }

    pub fn stats(&self) -> CacheStats {
        let lookups = self.hits + self.misses;
        CacheStats {
            size: self.entries.len(),
            capacity: self.config.max_entries,
            hit_count: self.hits,
            miss_count: self.misses,
            hit_rate: if lookups == 0 {
                0.0
            } else {
                self.hits as f64 / lookups as f64
            },
            evictions: self.evictions,
            expirations: self.expirations,
        }
    }
}

impl Default for TransformationCache {
    fn default() -> Self {
        Self::new()
    }
}
