//! Canonical model instances, one per logical path.
//!
//! The cache owns the canonical instances. Entries are write-once: a `put`
//! for a path that is already present keeps the existing entry. Nothing is
//! evicted implicitly; only [`AssetCache::clear`] and the explicit removal
//! helpers drop entries, and clones handed out earlier are unaffected.

use std::{collections::HashMap, sync::Arc};

use crate::data_structures::model::Model;

/// Where a canonical entry came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Origin {
    /// Supplied by the asset source.
    Fetched,
    /// Synthesized because the asset source failed.
    Fallback,
}

#[derive(Clone, Debug)]
struct CacheEntry {
    // Shared only with the in-flight load that produced it, never with callers.
    model: Arc<Model>,
    origin: Origin,
}

impl CacheEntry {
    fn model(&self) -> &Model {
        &self.model
    }

    fn origin(&self) -> Origin {
        self.origin
    }
}

#[derive(Debug, Default)]
pub struct AssetCache {
    entries: HashMap<String, CacheEntry>,
}

impl AssetCache {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    pub fn get(&self, path: &str) -> Option<&Model> {
        self.entries.get(path).map(CacheEntry::model)
    }

    pub fn origin(&self, path: &str) -> Option<Origin> {
        self.entries.get(path).map(CacheEntry::origin)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.entries.contains_key(path)
    }

    /// Stores `model` as the canonical instance for `path`. Returns `false`, and
    /// keeps the existing entry, if `path` is already cached.
    pub fn put(&mut self, path: impl Into<String>, model: Model, origin: Origin) -> bool {
        self.put_shared(path.into(), Arc::new(model), origin)
    }

    pub(crate) fn put_shared(&mut self, path: String, model: Arc<Model>, origin: Origin) -> bool {
        if self.entries.contains_key(&path) {
            return false;
        }
        self.entries.insert(path, CacheEntry { model, origin });
        true
    }

    pub(crate) fn shared(&self, path: &str) -> Option<(Arc<Model>, Origin)> {
        self.entries
            .get(path)
            .map(|entry| (Arc::clone(&entry.model), entry.origin))
    }

    pub fn remove(&mut self, path: &str) -> bool {
        self.entries.remove(path).is_some()
    }

    /// Drops every entry whose origin is `origin`. Returns how many were dropped.
    pub fn remove_origin(&mut self, origin: Origin) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.origin != origin);
        before - self.entries.len()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}
