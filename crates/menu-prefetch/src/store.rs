//! Key -> entry map. Not synchronized; the coordinator owns it behind its mutex.

use menu_types::PrefetchEntry;
use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct PrefetchStore {
    entries: HashMap<String, PrefetchEntry>,
}

impl PrefetchStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&PrefetchEntry> {
        self.entries.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut PrefetchEntry> {
        self.entries.get_mut(key)
    }

    /// Insert or replace the entry for `key`, returning the previous one.
    pub fn put(&mut self, key: &str, entry: PrefetchEntry) -> Option<PrefetchEntry> {
        self.entries.insert(key.to_string(), entry)
    }

    pub fn delete(&mut self, key: &str) -> Option<PrefetchEntry> {
        self.entries.remove(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn values(&self) -> impl Iterator<Item = &PrefetchEntry> {
        self.entries.values()
    }
}
