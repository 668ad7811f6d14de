//! Read traces and their recording
//!
//! A [`ReadTrace`] names one kind of access to a storage snapshot. Queries
//! record the traces they perform into a [`ReadTracker`]; a mutation reports
//! the traces it may have changed. Both sides agree through
//! [`ReadTrace::trace_hash`].

use std::fmt;

use crate::hash::{ReadTraceHash, ReadTraceHashSet};

/// Identity of one entity in a storage snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId {
    /// Numeric id of the entity's type
    pub entity_type: u32,
    /// Slot of the entity within its type's array
    pub slot: u32,
}

impl EntityId {
    pub const fn new(entity_type: u32, slot: u32) -> Self {
        Self { entity_type, slot }
    }

    /// Packed form: type in the high half, slot in the low half
    pub const fn as_u64(&self) -> u64 {
        ((self.entity_type as u64) << 32) | self.slot as u64
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.entity_type, self.slot)
    }
}

/// Identity of a subscriber whose cached results depend on storage reads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriberId(pub u64);

impl fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "subscriber#{}", self.0)
    }
}

/// One kind of read performed against a storage snapshot
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ReadTrace {
    /// Enumerated all entities of a type
    EntitiesOfType { entity_type: u32 },
    /// Read one field of one entity
    FieldAccess { entity: EntityId, field: String },
    /// Resolved an entity by its symbolic id
    Resolve { symbolic_id: String },
    /// Looked up entities of a type that refer to a symbolic id
    ReferrersOf {
        symbolic_id: String,
        entity_type: u32,
    },
    /// Read an external mapping attached to the storage
    ExternalMapping { identifier: String },
}

impl ReadTrace {
    pub fn entities_of_type(entity_type: u32) -> Self {
        Self::EntitiesOfType { entity_type }
    }

    pub fn field_access(entity: EntityId, field: impl Into<String>) -> Self {
        Self::FieldAccess {
            entity,
            field: field.into(),
        }
    }

    pub fn resolve(symbolic_id: impl Into<String>) -> Self {
        Self::Resolve {
            symbolic_id: symbolic_id.into(),
        }
    }

    pub fn referrers_of(symbolic_id: impl Into<String>, entity_type: u32) -> Self {
        Self::ReferrersOf {
            symbolic_id: symbolic_id.into(),
            entity_type,
        }
    }

    pub fn external_mapping(identifier: impl Into<String>) -> Self {
        Self::ExternalMapping {
            identifier: identifier.into(),
        }
    }

    /// Hash identifying this trace. Deterministic for equal traces.
    pub fn trace_hash(&self) -> ReadTraceHash {
        fxhash::hash64(self)
    }
}

/// Collects the traces of one logical read
#[derive(Debug, Clone, Default)]
pub struct ReadTracker {
    traces: ReadTraceHashSet,
}

impl ReadTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a trace and return its hash
    pub fn record(&mut self, trace: &ReadTrace) -> ReadTraceHash {
        let hash = trace.trace_hash();
        self.traces.insert(hash);
        hash
    }

    /// Record an already hashed trace
    pub fn record_hash(&mut self, hash: ReadTraceHash) {
        self.traces.insert(hash);
    }

    pub fn traces(&self) -> &ReadTraceHashSet {
        &self.traces
    }

    pub fn len(&self) -> usize {
        self.traces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.traces.is_empty()
    }

    pub fn into_traces(self) -> ReadTraceHashSet {
        self.traces
    }
}

/// Hash a batch of traces, e.g. everything touched by one mutation
pub fn hash_traces<'a, I>(traces: I) -> ReadTraceHashSet
where
    I: IntoIterator<Item = &'a ReadTrace>,
{
    traces.into_iter().map(ReadTrace::trace_hash).collect()
}
