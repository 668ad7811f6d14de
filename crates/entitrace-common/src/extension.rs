//! Ordered provider lists
//!
//! An [`ExtensionList`] holds every implementation of one capability trait.
//! Providers are kept sorted by priority (lower first), ties in insertion
//! order, and the list is built once and then only iterated.

use std::fmt::Display;
use std::sync::Arc;
use tracing::warn;

struct Registered<E: ?Sized> {
    name: &'static str,
    priority: u32,
    provider: Arc<E>,
}

/// Priority-ordered list of providers for one capability
pub struct ExtensionList<E: ?Sized> {
    entries: Vec<Registered<E>>,
}

impl<E: ?Sized> ExtensionList<E> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Register a provider. Equal priorities keep insertion order.
    pub fn register(&mut self, name: &'static str, priority: u32, provider: Arc<E>) {
        let position = self
            .entries
            .iter()
            .position(|entry| entry.priority > priority)
            .unwrap_or(self.entries.len());
        self.entries.insert(
            position,
            Registered {
                name,
                priority,
                provider,
            },
        );
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Provider names in dispatch order
    pub fn names(&self) -> Vec<&'static str> {
        self.entries.iter().map(|entry| entry.name).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<E>> {
        self.entries.iter().map(|entry| &entry.provider)
    }

    /// First provider (in dispatch order) accepted by `predicate`
    pub fn find_first<P>(&self, mut predicate: P) -> Option<Arc<E>>
    where
        P: FnMut(&E) -> bool,
    {
        self.entries
            .iter()
            .find(|entry| predicate(entry.provider.as_ref()))
            .map(|entry| Arc::clone(&entry.provider))
    }

    /// Run `f` on every provider. A failing provider is logged and skipped;
    /// the number of failures is returned.
    pub fn for_each_safe<F, Err>(&self, mut f: F) -> usize
    where
        F: FnMut(&E) -> Result<(), Err>,
        Err: Display,
    {
        let mut failures = 0;
        for entry in &self.entries {
            if let Err(e) = f(entry.provider.as_ref()) {
                warn!(extension = entry.name, "Extension failed: {}", e);
                failures += 1;
            }
        }
        failures
    }
}

impl<E: ?Sized> Default for ExtensionList<E> {
    fn default() -> Self {
        Self::new()
    }
}
