//! Shared merge point for per-transaction indexes
//!
//! Readers fill a private [`ReadTraceIndex`] while they run and merge it
//! here once the read completes. Writers query it for the consumers to
//! invalidate.

use std::fmt::Debug;
use std::hash::Hash;
use std::sync::Arc;

use fxhash::FxHashSet;
use parking_lot::RwLock;
use tracing::debug;

use crate::hash::{ReadTraceHash, ReadTraceHashSet};
use crate::index::ReadTraceIndex;

/// `Arc<RwLock<ReadTraceIndex<T>>>` with the index operations on it
pub struct SharedReadTraceIndex<T> {
    inner: Arc<RwLock<ReadTraceIndex<T>>>,
}

impl<T> SharedReadTraceIndex<T>
where
    T: Eq + Hash + Clone,
{
    pub fn new() -> Self {
        Self::from_index(ReadTraceIndex::new())
    }

    pub fn from_index(index: ReadTraceIndex<T>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(index)),
        }
    }

    pub fn get(&self, trace: ReadTraceHash) -> FxHashSet<T> {
        self.inner.read().get(trace)
    }

    pub fn get_many<'a, I>(&self, traces: I) -> FxHashSet<T>
    where
        I: IntoIterator<Item = &'a ReadTraceHash>,
    {
        self.inner.read().get_many(traces)
    }

    pub fn set(&self, traces: ReadTraceHashSet, obj: T) {
        self.inner.write().set(traces, obj);
    }

    pub fn remove(&self, obj: &T) -> bool {
        self.inner.write().remove(obj)
    }

    /// Merge a finished scratch index
    pub fn pull_from(&self, scratch: &ReadTraceIndex<T>) {
        let mut index = self.inner.write();
        index.pull(scratch);
        debug!(
            merged = scratch.consumer_count(),
            consumers = index.consumer_count(),
            traces = index.trace_count(),
            "Merged scratch read trace index"
        );
    }

    /// Deep copy of the current index
    pub fn snapshot(&self) -> ReadTraceIndex<T> {
        self.inner.read().clone()
    }

    pub fn consumer_count(&self) -> usize {
        self.inner.read().consumer_count()
    }

    pub fn trace_count(&self) -> usize {
        self.inner.read().trace_count()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }
}

impl<T> SharedReadTraceIndex<T>
where
    T: Eq + Hash + Clone + Debug,
{
    pub fn check_consistency(&self) -> crate::Result<()> {
        self.inner.read().check_consistency()
    }
}

impl<T> Clone for SharedReadTraceIndex<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> Default for SharedReadTraceIndex<T>
where
    T: Eq + Hash + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}
