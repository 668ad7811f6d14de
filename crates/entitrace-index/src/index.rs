//! Bidirectional consumer/trace index

use std::collections::hash_map::Entry;
use std::fmt::Debug;
use std::hash::Hash;

use fxhash::{FxHashMap, FxHashSet};
use tracing::trace;

use crate::error::{IndexError, Result};
use crate::hash::{ReadTraceHash, ReadTraceHashSet};

/// Maps consumers to the read traces they depend on, and traces back to
/// their consumers.
///
/// Invariants kept by every operation:
/// - `t ∈ obj_to_trace[o]` iff `o ∈ trace_to_obj[t]`
/// - no key of `trace_to_obj` maps to an empty set
/// - no key of `obj_to_trace` maps to an empty set
///
/// Not synchronized. Each transaction owns its own index and merges it into
/// a shared one with [`pull`](Self::pull).
#[derive(Debug, Clone)]
pub struct ReadTraceIndex<T> {
    obj_to_trace: FxHashMap<T, ReadTraceHashSet>,
    trace_to_obj: FxHashMap<ReadTraceHash, FxHashSet<T>>,
}

impl<T> ReadTraceIndex<T>
where
    T: Eq + Hash + Clone,
{
    pub fn new() -> Self {
        Self {
            obj_to_trace: FxHashMap::default(),
            trace_to_obj: FxHashMap::default(),
        }
    }

    /// Consumers registered against `trace`
    pub fn get(&self, trace: ReadTraceHash) -> FxHashSet<T> {
        self.trace_to_obj.get(&trace).cloned().unwrap_or_default()
    }

    /// Consumers registered against any of `traces`
    pub fn get_many<'a, I>(&self, traces: I) -> FxHashSet<T>
    where
        I: IntoIterator<Item = &'a ReadTraceHash>,
    {
        let mut consumers = FxHashSet::default();
        for trace in traces {
            if let Some(objs) = self.trace_to_obj.get(trace) {
                consumers.extend(objs.iter().cloned());
            }
        }
        consumers
    }

    /// Replace the registration of `obj` with `traces`.
    ///
    /// An empty `traces` removes `obj` entirely.
    pub fn set(&mut self, traces: ReadTraceHashSet, obj: T) {
        let previous = self.obj_to_trace.remove(&obj);

        if let Some(previous) = &previous {
            for trace in previous.iter().filter(|trace| !traces.contains(*trace)) {
                self.detach(*trace, &obj);
            }
        }

        for trace in &traces {
            let already_attached = previous
                .as_ref()
                .is_some_and(|previous| previous.contains(trace));
            if !already_attached {
                self.trace_to_obj
                    .entry(*trace)
                    .or_default()
                    .insert(obj.clone());
            }
        }

        if !traces.is_empty() {
            self.obj_to_trace.insert(obj, traces);
        }
    }

    /// Remove `obj` from the index. Returns whether it was registered.
    pub fn remove(&mut self, obj: &T) -> bool {
        match self.obj_to_trace.remove(obj) {
            Some(traces) => {
                for trace in traces {
                    self.detach(trace, obj);
                }
                true
            }
            None => false,
        }
    }

    /// Import every registration of `other`, replacing registrations of the
    /// same consumers. Nothing is shared with `other` afterwards.
    pub fn pull(&mut self, other: &ReadTraceIndex<T>) {
        if self.is_empty() {
            trace!(
                consumers = other.consumer_count(),
                traces = other.trace_count(),
                "Pulling read trace index into empty index"
            );
            self.obj_to_trace = other.obj_to_trace.clone();
            self.trace_to_obj = other.trace_to_obj.clone();
            return;
        }

        trace!(
            consumers = other.consumer_count(),
            existing = self.consumer_count(),
            "Merging read trace index"
        );
        for (obj, traces) in &other.obj_to_trace {
            self.set(traces.clone(), obj.clone());
        }
    }

    /// Traces `obj` is currently registered against
    pub fn traces_of(&self, obj: &T) -> ReadTraceHashSet {
        self.obj_to_trace.get(obj).cloned().unwrap_or_default()
    }

    pub fn contains(&self, obj: &T) -> bool {
        self.obj_to_trace.contains_key(obj)
    }

    pub fn consumers(&self) -> impl Iterator<Item = &T> {
        self.obj_to_trace.keys()
    }

    pub fn consumer_count(&self) -> usize {
        self.obj_to_trace.len()
    }

    pub fn trace_count(&self) -> usize {
        self.trace_to_obj.len()
    }

    pub fn is_empty(&self) -> bool {
        self.obj_to_trace.is_empty()
    }

    pub fn clear(&mut self) {
        self.obj_to_trace.clear();
        self.trace_to_obj.clear();
    }

    fn detach(&mut self, trace: ReadTraceHash, obj: &T) {
        if let Entry::Occupied(mut entry) = self.trace_to_obj.entry(trace) {
            entry.get_mut().remove(obj);
            if entry.get().is_empty() {
                entry.remove();
            }
        }
    }
}

impl<T> ReadTraceIndex<T>
where
    T: Eq + Hash + Clone + Debug,
{
    /// Verify both directions of the index agree.
    pub fn check_consistency(&self) -> Result<()> {
        for (obj, traces) in &self.obj_to_trace {
            if traces.is_empty() {
                return Err(IndexError::empty_trace_set(format!("{:?}", obj)));
            }
            for trace in traces {
                let attached = self
                    .trace_to_obj
                    .get(trace)
                    .is_some_and(|objs| objs.contains(obj));
                if !attached {
                    return Err(IndexError::asymmetric(format!("{:?}", obj), *trace));
                }
            }
        }

        for (trace, objs) in &self.trace_to_obj {
            if objs.is_empty() {
                return Err(IndexError::EmptyConsumerSet { trace: *trace });
            }
            for obj in objs {
                let registered = self
                    .obj_to_trace
                    .get(obj)
                    .is_some_and(|traces| traces.contains(trace));
                if !registered {
                    return Err(IndexError::asymmetric(format!("{:?}", obj), *trace));
                }
            }
        }

        Ok(())
    }
}

impl<T> Default for ReadTraceIndex<T>
where
    T: Eq + Hash + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}
