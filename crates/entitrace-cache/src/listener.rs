//! Invalidation listeners

use crate::error::Result;

/// Notified after a cache dropped queries because their traces changed.
///
/// Listeners are dispatched in priority order. A failing listener is logged
/// and does not stop the others.
pub trait InvalidationListener<Q>: Send + Sync {
    fn on_invalidated(&self, queries: &[Q]) -> Result<()>;
}
