//! Traced per-snapshot query cache

use std::convert::Infallible;
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::Arc;

use entitrace_common::ExtensionList;
use entitrace_index::{ReadTraceHashSet, ReadTraceIndex, ReadTracker};
use fxhash::FxHashMap;
use tracing::{debug, trace, warn};

use crate::error::CacheError;
use crate::listener::InvalidationListener;
use crate::metrics::{CacheMetrics, CacheStats};
use crate::settings::SnapshotCacheConfig;

/// A query result and whether it came from the cache
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedValue<V> {
    pub value: V,
    pub from_cache: bool,
}

/// Query results of one storage snapshot, each registered against the read
/// traces it performed.
///
/// A result computed without recording any trace stays cached until the
/// cache itself is dropped or cleared.
pub struct TracedSnapshotCache<Q, V> {
    config: SnapshotCacheConfig,
    values: FxHashMap<Q, V>,
    index: ReadTraceIndex<Q>,
    listeners: ExtensionList<dyn InvalidationListener<Q>>,
    metrics: CacheMetrics,
}

impl<Q, V> TracedSnapshotCache<Q, V>
where
    Q: Eq + Hash + Clone + Debug + 'static,
    V: Clone,
{
    pub fn new() -> Self {
        Self::with_config(SnapshotCacheConfig::default())
    }

    pub fn with_config(config: SnapshotCacheConfig) -> Self {
        Self {
            config,
            values: FxHashMap::default(),
            index: ReadTraceIndex::new(),
            listeners: ExtensionList::new(),
            metrics: CacheMetrics::new(),
        }
    }

    pub fn config(&self) -> &SnapshotCacheConfig {
        &self.config
    }

    /// Register a listener; lower priorities are notified first
    pub fn add_listener(
        &mut self,
        name: &'static str,
        priority: u32,
        listener: Arc<dyn InvalidationListener<Q>>,
    ) {
        self.listeners.register(name, priority, listener);
    }

    /// Cached result of `query`, computing and tracing it on a miss
    pub fn cached<F>(&mut self, query: Q, compute: F) -> CachedValue<V>
    where
        F: FnOnce(&mut ReadTracker) -> V,
    {
        match self.try_cached::<_, Infallible>(query, |tracker| Ok(compute(tracker))) {
            Ok(value) => value,
            Err(never) => match never {},
        }
    }

    /// Like [`cached`](Self::cached) for fallible queries. Errors are
    /// returned as-is and nothing is stored.
    pub fn try_cached<F, E>(&mut self, query: Q, compute: F) -> Result<CachedValue<V>, E>
    where
        F: FnOnce(&mut ReadTracker) -> Result<V, E>,
    {
        if let Some(value) = self.values.get(&query) {
            if self.config.enable_metrics {
                self.metrics.record_hit();
            }
            return Ok(CachedValue {
                value: value.clone(),
                from_cache: true,
            });
        }

        if self.config.enable_metrics {
            self.metrics.record_miss();
        }

        let mut tracker = ReadTracker::new();
        let value = compute(&mut tracker)?;

        if let Some(max) = self.config.max_entries {
            if self.values.len() >= max {
                debug!(?query, max, "Snapshot cache full, result not stored");
                if self.config.enable_metrics {
                    self.metrics.record_rejected();
                }
                return Ok(CachedValue {
                    value,
                    from_cache: false,
                });
            }
        }

        trace!(?query, traces = tracker.len(), "Caching query result");
        self.index.set(tracker.into_traces(), query.clone());
        self.values.insert(query, value.clone());
        self.after_mutation();

        Ok(CachedValue {
            value,
            from_cache: false,
        })
    }

    /// Cached result of `query` without computing or counting a lookup
    pub fn peek(&self, query: &Q) -> Option<&V> {
        self.values.get(query)
    }

    /// Traces `query` was registered with
    pub fn traces_of(&self, query: &Q) -> ReadTraceHashSet {
        self.index.traces_of(query)
    }

    /// Drop every cached query that read any of `changes`.
    ///
    /// Returns the number of dropped queries.
    pub fn invalidate(&mut self, changes: &ReadTraceHashSet) -> usize {
        let affected: Vec<Q> = self.index.get_many(changes).into_iter().collect();
        if affected.is_empty() {
            return 0;
        }

        for query in &affected {
            self.index.remove(query);
            self.values.remove(query);
        }

        debug!(
            changed = changes.len(),
            dropped = affected.len(),
            remaining = self.values.len(),
            "Invalidated snapshot cache entries"
        );

        if self.config.enable_metrics {
            self.metrics.record_invalidations(affected.len());
        }
        self.after_mutation();

        let failures = self
            .listeners
            .for_each_safe(|listener| listener.on_invalidated(&affected));
        if failures > 0 {
            warn!(failures, "Invalidation listeners failed");
        }

        affected.len()
    }

    /// Drop one query explicitly
    pub fn invalidate_query(&mut self, query: &Q) -> bool {
        self.index.remove(query);
        let removed = self.values.remove(query).is_some();
        if removed {
            self.after_mutation();
        }
        removed
    }

    /// Take over the entries of the previous snapshot's cache, then drop
    /// those affected by `changes`.
    ///
    /// Entries of `previous` replace entries for the same query. Nothing is
    /// shared with `previous` afterwards.
    pub fn pull_cache(&mut self, previous: &TracedSnapshotCache<Q, V>, changes: &ReadTraceHashSet) {
        self.index.pull(&previous.index);
        for (query, value) in &previous.values {
            if !previous.index.contains(query) {
                // Untraced in `previous`; drop any traces this cache had for it
                self.index.remove(query);
            }
            self.values.insert(query.clone(), value.clone());
        }

        if self.config.enable_metrics {
            self.metrics.record_pull();
        }
        self.after_mutation();

        let dropped = self.invalidate(changes);
        debug!(
            pulled = previous.values.len(),
            dropped,
            "Pulled snapshot cache"
        );
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn clear(&mut self) {
        self.values.clear();
        self.index.clear();
        self.after_mutation();
    }

    pub fn stats(&self) -> CacheStats {
        self.metrics.snapshot()
    }

    /// Zero the traffic counters; the entry count is kept
    pub fn reset_stats(&self) {
        self.metrics.reset();
    }

    /// Verify the trace index and that every traced query has a value
    pub fn check_consistency(&self) -> crate::Result<()> {
        self.index.check_consistency()?;
        if let Some(orphan) = self
            .index
            .consumers()
            .find(|query| !self.values.contains_key(*query))
        {
            return Err(CacheError::validation(format!(
                "traced query {:?} has no cached value",
                orphan
            )));
        }
        Ok(())
    }

    fn after_mutation(&self) {
        if self.config.enable_metrics {
            self.metrics.set_entry_count(self.values.len());
        }
        if self.config.verify_consistency {
            if let Err(e) = self.check_consistency() {
                warn!("Snapshot cache inconsistent: {}", e);
            }
        }
    }
}

impl<Q, V> Default for TracedSnapshotCache<Q, V>
where
    Q: Eq + Hash + Clone + Debug + 'static,
    V: Clone,
{
    fn default() -> Self {
        Self::new()
    }
}
