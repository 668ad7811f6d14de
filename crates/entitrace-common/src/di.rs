//! Service factory registration for auto-discovery
//!
//! Every crate that exposes default services submits a [`ServiceFactory`]
//! through `inventory::submit!`. The owner of the process calls
//! [`collect_all_services`] once during startup and wires the returned
//! entries into whatever it constructs next. Nothing looks services up
//! ad hoc after that.
//!
//! ```rust,ignore
//! use entitrace_common::di::{ServiceEntry, ServiceFactory};
//! use std::sync::Arc;
//!
//! inventory::submit! {
//!     ServiceFactory::new("trace-index", create_index_services)
//! }
//!
//! fn create_index_services() -> Vec<ServiceEntry> {
//!     vec![ServiceEntry::new::<SharedReadTraceIndex<u64>>(Arc::new(SharedReadTraceIndex::new()))]
//! }
//! ```

use std::any::{Any, TypeId};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Error type for registry operations
#[derive(Debug, thiserror::Error)]
pub enum DIRegistrationError {
    #[error("Service registration failed: {message}")]
    RegistrationFailed { message: String },

    #[error("Service resolution failed: {type_name}")]
    ResolutionFailed { type_name: String },
}

/// Result type for registry operations
pub type DIRegistrationResult<T> = Result<T, DIRegistrationError>;

/// A type-erased service instance produced by a factory.
pub struct ServiceEntry {
    /// The TypeId of the service (used as registration key)
    pub type_id: TypeId,

    /// Human-readable type name for debugging
    pub type_name: &'static str,

    /// The service instance (type-erased)
    pub instance: Arc<dyn Any + Send + Sync>,
}

impl ServiceEntry {
    /// Create a new service entry for a concrete type
    pub fn new<T: Send + Sync + 'static>(instance: Arc<T>) -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
            instance: instance as Arc<dyn Any + Send + Sync>,
        }
    }

    /// Recover the concrete service, if this entry holds a `T`
    pub fn downcast<T: Send + Sync + 'static>(&self) -> DIRegistrationResult<Arc<T>> {
        Arc::clone(&self.instance)
            .downcast::<T>()
            .map_err(|_| DIRegistrationError::ResolutionFailed {
                type_name: std::any::type_name::<T>().to_string(),
            })
    }
}

impl std::fmt::Debug for ServiceEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceEntry")
            .field("type_id", &self.type_id)
            .field("type_name", &self.type_name)
            .finish()
    }
}

/// A factory that creates the default services of one crate.
pub struct ServiceFactory {
    /// Name of the service group (e.g. "trace-index", "snapshot-cache")
    pub name: &'static str,

    /// Factory function that creates and returns services
    pub factory_fn: fn() -> Vec<ServiceEntry>,

    /// Registration order (lower = earlier, default = 100)
    pub priority: u32,

    /// Names of service groups that must be registered first
    pub dependencies: &'static [&'static str],
}

impl ServiceFactory {
    /// Create a new service factory with default priority
    pub const fn new(name: &'static str, factory_fn: fn() -> Vec<ServiceEntry>) -> Self {
        Self {
            name,
            factory_fn,
            priority: 100,
            dependencies: &[],
        }
    }

    /// Create a new service factory with custom priority
    pub const fn with_priority(
        name: &'static str,
        factory_fn: fn() -> Vec<ServiceEntry>,
        priority: u32,
    ) -> Self {
        Self {
            name,
            factory_fn,
            priority,
            dependencies: &[],
        }
    }

    /// Create a new service factory with priority and dependencies
    pub const fn full(
        name: &'static str,
        factory_fn: fn() -> Vec<ServiceEntry>,
        priority: u32,
        dependencies: &'static [&'static str],
    ) -> Self {
        Self {
            name,
            factory_fn,
            priority,
            dependencies,
        }
    }
}

inventory::collect!(ServiceFactory);

/// Run every discovered factory and return their services.
///
/// Factories run in priority order (stable for equal priorities). A factory
/// naming a dependency that was never submitted is logged and still run.
pub fn collect_all_services() -> Vec<ServiceEntry> {
    let mut factories: Vec<&ServiceFactory> = inventory::iter::<ServiceFactory>().collect();
    factories.sort_by_key(|f| f.priority);

    info!(
        "Discovered {} service factories via inventory",
        factories.len()
    );

    for factory in &factories {
        for dependency in factory.dependencies {
            if !factories.iter().any(|f| f.name == *dependency) {
                warn!(
                    "Service factory '{}' depends on unknown factory '{}'",
                    factory.name, dependency
                );
            }
        }
    }

    let mut all_services = Vec::new();
    for factory in factories {
        let services = (factory.factory_fn)();
        debug!(
            "Factory '{}' (priority {}) created {} services",
            factory.name,
            factory.priority,
            services.len()
        );
        all_services.extend(services);
    }

    info!(
        "Collected {} total services from all factories",
        all_services.len()
    );
    all_services
}

/// Number of discovered service factories
pub fn discovered_factory_count() -> usize {
    inventory::iter::<ServiceFactory>().count()
}

/// Names of all discovered service factories
pub fn list_discovered_factories() -> Vec<&'static str> {
    inventory::iter::<ServiceFactory>().map(|f| f.name).collect()
}
