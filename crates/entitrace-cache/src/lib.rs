//! # Entitrace Cache
//!
//! Query result cache attached to one storage snapshot.
//!
//! Each cached query remembers the read traces it performed. When a new
//! snapshot is built from a builder's changes, the new cache pulls every
//! entry of the previous one and drops exactly those whose traces changed.
//!
//! ## Features
//!
//! - **Traced caching**: results are keyed by query and registered in a
//!   [`ReadTraceIndex`](entitrace_index::ReadTraceIndex)
//! - **Snapshot hand-over**: [`TracedSnapshotCache::pull_cache`]
//! - **Invalidation listeners**: ordered [`InvalidationListener`] providers
//! - **Metrics**: hit/miss/invalidation counters

pub mod di;
pub mod error;
pub mod listener;
pub mod metrics;
pub mod settings;
pub mod snapshot;

pub use error::{CacheError, Result};
pub use listener::InvalidationListener;
pub use metrics::{CacheMetrics, CacheStats};
pub use settings::SnapshotCacheConfig;
pub use snapshot::{CachedValue, TracedSnapshotCache};
