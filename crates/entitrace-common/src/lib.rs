//! Shared utilities for entitrace crates
//!
//! - [`di`]: factory registration collected once at startup via `inventory`
//! - [`extension`]: ordered provider lists with short-circuiting lookup
//! - [`logging`]: `tracing` subscriber setup and error chain formatting

pub mod di;
pub mod extension;
pub mod logging;

pub use di::{
    collect_all_services, discovered_factory_count, list_discovered_factories,
    DIRegistrationError, DIRegistrationResult, ServiceEntry, ServiceFactory,
};
pub use extension::ExtensionList;
pub use logging::{format_error, init_logging, LogLevel};
