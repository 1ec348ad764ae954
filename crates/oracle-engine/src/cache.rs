// cache.rs — Process-scoped compiled-pattern cache.
//
// Lifetime: created empty when the oracle starts, grows monotonically as
// strategies compile regex sources, and is never evicted during one
// invocation. Entries are keyed by the resolved pattern source, so compiling
// the same source twice returns the same `Arc<Regex>`.
//
// The cache is passed explicitly to everything that compiles patterns
// (token construction, instantiation, strategy compilation) rather than
// living in a global, so tests can inspect hits and misses.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use regex::Regex;

use crate::error::OracleError;

/// Snapshot of cache usage counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStats {
    /// Distinct sources compiled so far.
    pub entries: usize,
    /// Lookups served from the cache.
    pub hits: u64,
    /// Lookups that had to compile.
    pub misses: u64,
}

/// Append-only map from regex source to compiled pattern.
///
/// Interior mutability (`RwLock`) lets the cache be shared by reference
/// while still recording new entries; readers never block each other.
#[derive(Debug, Default)]
pub struct PatternCache {
    compiled: RwLock<HashMap<String, Arc<Regex>>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl PatternCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the compiled pattern for `source`, compiling it on first use.
    ///
    /// A source that fails to compile is not cached; every attempt reports
    /// `InvalidPattern`.
    pub fn compile(&self, source: &str) -> Result<Arc<Regex>, OracleError> {
        {
            let compiled = self.compiled.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(regex) = compiled.get(source) {
                self.hits.fetch_add(1, Ordering::Relaxed);
                return Ok(Arc::clone(regex));
            }
        }

        let mut compiled = self.compiled.write().unwrap_or_else(PoisonError::into_inner);
        // Another writer may have inserted between the read and write locks.
        if let Some(regex) = compiled.get(source) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Ok(Arc::clone(regex));
        }

        let regex = Regex::new(source).map_err(|e| OracleError::InvalidPattern {
            pattern: source.to_string(),
            reason: e.to_string(),
        })?;
        tracing::trace!(pattern = source, "compiled pattern");
        self.misses.fetch_add(1, Ordering::Relaxed);

        let regex = Arc::new(regex);
        compiled.insert(source.to_string(), Arc::clone(&regex));
        Ok(regex)
    }

    /// Number of distinct compiled sources.
    pub fn len(&self) -> usize {
        self.compiled
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}
