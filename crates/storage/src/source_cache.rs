//! In-memory cache of tables loaded from disk.
//!
//! Each loaded value is keyed by the path it was read from. The first
//! access loads it; later accesses share the same `Arc`. Entries live for
//! the lifetime of the cache and are never invalidated, since the upstream
//! inputs do not change while the dashboard runs. Failed loads are not
//! cached, so a fixed file is picked up on the next access.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// Statistics for a source cache
#[derive(Debug, Default, Clone, PartialEq)]
pub struct SourceCacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

impl SourceCacheStats {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            (self.hits as f64 / total as f64) * 100.0
        }
    }
}

/// Path-keyed cache of loaded values.
pub struct SourceCache<T> {
    /// Source path -> loaded value
    entries: RwLock<HashMap<PathBuf, Arc<T>>>,
    stats: RwLock<SourceCacheStats>,
    /// Label used in logs
    name: &'static str,
}

impl<T> SourceCache<T> {
    pub fn new(name: &'static str) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            stats: RwLock::new(SourceCacheStats::default()),
            name,
        }
    }

    /// Return the cached value for `path`, loading it with `load` on first access.
    ///
    /// Concurrent first accesses load once: the loader runs while the write
    /// lock is held and later callers find the stored value.
    pub async fn get_or_try_load<E, F>(&self, path: &Path, load: F) -> Result<Arc<T>, E>
    where
        F: FnOnce(&Path) -> Result<T, E>,
    {
        if let Some(value) = self.entries.read().await.get(path).cloned() {
            self.stats.write().await.hits += 1;
            return Ok(value);
        }

        let mut entries = self.entries.write().await;
        // Another caller may have loaded it while we waited for the lock
        if let Some(value) = entries.get(path).cloned() {
            self.stats.write().await.hits += 1;
            return Ok(value);
        }

        let value = Arc::new(load(path)?);
        entries.insert(path.to_path_buf(), Arc::clone(&value));

        let mut stats = self.stats.write().await;
        stats.misses += 1;
        stats.entries = entries.len();
        debug!(cache = self.name, path = %path.display(), entries = entries.len(), "Loaded into cache");
        Ok(value)
    }

    /// Get current cache statistics.
    pub async fn stats(&self) -> SourceCacheStats {
        let entries = self.entries.read().await;
        let mut stats = self.stats.write().await;
        stats.entries = entries.len();
        stats.clone()
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}
