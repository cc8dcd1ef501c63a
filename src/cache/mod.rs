//! Query cache layer: get-or-compute caching for repeated reads.
//!
//! Every entry is tagged with the artifact checksum it was computed against,
//! so a read never serves a result computed against a different artifact than
//! the caller sees. The orchestrator calls [`QueryCache::clear`] after every
//! persisted refresh: a forced re-run can replace the artifact without the
//! manifest checksum changing, so checksum comparison alone cannot tell a
//! pre-refresh entry from a post-refresh one. Entries additionally expire
//! after a TTL.

use anyhow::Result;
use dashmap::DashMap;
use serde_json::Value;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

/// One cached read result.
struct CacheEntry {
    /// Artifact checksum this result was computed against.
    checksum: String,
    inserted_at: Instant,
    value: Arc<Value>,
}

/// Keyed, TTL-bounded, checksum-tagged cache for read operations.
pub struct QueryCache {
    entries: DashMap<String, CacheEntry>,
    ttl: Duration,
}

impl QueryCache {
    /// Create a cache with the given entry TTL.
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    /// Canonical cache key from operation name and normalized parameters.
    #[must_use]
    pub fn key(operation: &str, params: &[&str]) -> String {
        if params.is_empty() {
            operation.to_string()
        } else {
            format!("{operation}:{}", params.join(":"))
        }
    }

    /// Return the cached value for this key, or compute, store, and return it.
    ///
    /// A hit requires the entry to carry the current artifact checksum and to
    /// be within its TTL; anything else is recomputed.
    pub fn get_or_compute(
        &self,
        key: &str,
        current_checksum: &str,
        compute: impl FnOnce() -> Result<Value>,
    ) -> Result<Arc<Value>> {
        if let Some(entry) = self.entries.get(key) {
            if entry.checksum == current_checksum && entry.inserted_at.elapsed() < self.ttl {
                debug!("Query cache hit: {key}");
                return Ok(Arc::clone(&entry.value));
            }
        }

        let value = Arc::new(compute()?);
        self.entries.insert(
            key.to_string(),
            CacheEntry {
                checksum: current_checksum.to_string(),
                inserted_at: Instant::now(),
                value: Arc::clone(&value),
            },
        );
        Ok(value)
    }

    /// Drop everything.
    ///
    /// Called by the orchestrator after a successful refresh: every entry
    /// computed before the new artifact was persisted is dead, including
    /// entries whose checksum tag still matches.
    pub fn clear(&self) {
        let dropped = self.entries.len();
        self.entries.clear();
        debug!("Query cache cleared, dropped {dropped} entries");
    }

    /// Number of live entries (expired entries included until touched).
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when the cache holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
