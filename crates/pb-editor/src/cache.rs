//! Session-owned cache of constructed component instances.
//!
//! Hosts build expensive per-type renderers or previews once per editing
//! session. The cache lives on the session and is cleared when the session
//! ends, so nothing outlives the editor that created it.

use std::collections::HashMap;

#[derive(Debug)]
pub struct InstanceCache<V> {
    entries: HashMap<String, V>,
}

impl<V> Default for InstanceCache<V> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<V> InstanceCache<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached value for `key`, building it with `build` on first use.
    pub fn get_or_insert_with(&mut self, key: &str, build: impl FnOnce() -> V) -> &V {
        if !self.entries.contains_key(key) {
            log::trace!("CACHE build {key}");
            self.entries.insert(key.to_string(), build());
        }
        &self.entries[key]
    }

    pub fn get(&self, key: &str) -> Option<&V> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every cached instance.
    pub fn clear(&mut self) {
        if !self.entries.is_empty() {
            log::debug!("CACHE clear ({} entries)", self.entries.len());
        }
        self.entries.clear();
    }
}
