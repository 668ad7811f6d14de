//! # Entitrace Index
//!
//! Read-trace bookkeeping for the workspace entity storage.
//!
//! Every query against a storage snapshot records the [`ReadTrace`]s it
//! touched, hashed into a [`ReadTraceHashSet`]. A [`ReadTraceIndex`] maps
//! each consumer of query results to those hashes and back, so that after a
//! mutation the set of changed hashes yields exactly the consumers that have
//! to be recomputed.
//!
//! ## Features
//!
//! - **Bidirectional index**: consumer → traces and trace → consumers,
//!   kept symmetric on every update
//! - **Incremental replacement**: re-registering a consumer costs
//!   O(old traces + new traces)
//! - **Deep merge**: [`ReadTraceIndex::pull`] imports a scratch index without
//!   aliasing it
//! - **Shared merge point**: [`SharedReadTraceIndex`] for combining
//!   per-thread indexes

pub mod di;
pub mod error;
pub mod hash;
pub mod index;
pub mod shared;
pub mod trace;

pub use error::{IndexError, Result};
pub use hash::{trace_set, ReadTraceHash, ReadTraceHashSet};
pub use index::ReadTraceIndex;
pub use shared::SharedReadTraceIndex;
pub use trace::{hash_traces, EntityId, ReadTrace, ReadTracker, SubscriberId};
