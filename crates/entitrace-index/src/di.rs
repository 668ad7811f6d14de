//! Dependency injection support for entitrace-index

use std::sync::Arc;

use entitrace_common::di::{ServiceEntry, ServiceFactory};

use crate::{SharedReadTraceIndex, SubscriberId};

inventory::submit! {
    ServiceFactory::with_priority("trace-index", create_index_services, 50)
}

fn create_index_services() -> Vec<ServiceEntry> {
    vec![ServiceEntry::new::<SharedReadTraceIndex<SubscriberId>>(
        Arc::new(SharedReadTraceIndex::new()),
    )]
}
