//! Dependency injection support for entitrace-cache

use std::sync::Arc;

use entitrace_common::di::{ServiceEntry, ServiceFactory};
use tracing::warn;

use crate::SnapshotCacheConfig;

inventory::submit! {
    ServiceFactory::full("snapshot-cache", create_cache_services, 60, &["trace-index"])
}

fn create_cache_services() -> Vec<ServiceEntry> {
    let config = SnapshotCacheConfig::load(None).unwrap_or_else(|e| {
        warn!("Falling back to default snapshot cache config: {}", e);
        SnapshotCacheConfig::default()
    });

    vec![ServiceEntry::new::<SnapshotCacheConfig>(Arc::new(config))]
}
