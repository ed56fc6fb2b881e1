//! Reference-counted resource registry.
//!
//! Maps a resolved source path to exactly one resource object. Every
//! [`acquire`](ResourceRegistry::acquire) bumps the reference count and every
//! [`release`](ResourceRegistry::release) drops it; the resource is destroyed
//! synchronously when the count reaches zero.
//!
//! Keys are slotmap keys, so a key that outlived its resource never aliases a
//! resource created later for the same path.

use rustc_hash::FxHashMap;
use slotmap::{Key, SlotMap};

struct Entry<T> {
    resource: T,
    ref_count: u32,
    /// `None` for resources created from an unresolvable source.
    path: Option<String>,
}

pub struct ResourceRegistry<K: Key, T> {
    entries: SlotMap<K, Entry<T>>,
    lookup: FxHashMap<String, K>,
}

impl<K: Key, T> Default for ResourceRegistry<K, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Key, T> ResourceRegistry<K, T> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: SlotMap::with_key(),
            lookup: FxHashMap::default(),
        }
    }

    /// Checks out the resource for `path`, creating it with `create` if needed.
    ///
    /// A `None` path never deduplicates: each call yields a fresh, unregistered
    /// resource that is still released through the same key.
    pub fn acquire(&mut self, path: Option<&str>, create: impl FnOnce() -> T) -> K {
        let Some(path) = path else {
            return self.entries.insert(Entry {
                resource: create(),
                ref_count: 1,
                path: None,
            });
        };

        if let Some(&key) = self.lookup.get(path) {
            if let Some(entry) = self.entries.get_mut(key) {
                entry.ref_count += 1;
                return key;
            }
        }

        let key = self.entries.insert(Entry {
            resource: create(),
            ref_count: 1,
            path: Some(path.to_string()),
        });
        self.lookup.insert(path.to_string(), key);
        key
    }

    /// Returns one checkout of `key`. Returns the resource once its last
    /// checkout is released.
    pub fn release(&mut self, key: K) -> Option<T> {
        let entry = self.entries.get_mut(key)?;
        entry.ref_count = entry.ref_count.saturating_sub(1);
        if entry.ref_count > 0 {
            return None;
        }

        let entry = self.entries.remove(key)?;
        if let Some(path) = &entry.path {
            self.lookup.remove(path);
        }
        Some(entry.resource)
    }

    #[must_use]
    pub fn get(&self, key: K) -> Option<&T> {
        self.entries.get(key).map(|e| &e.resource)
    }

    pub fn get_mut(&mut self, key: K) -> Option<&mut T> {
        self.entries.get_mut(key).map(|e| &mut e.resource)
    }

    #[must_use]
    pub fn ref_count(&self, key: K) -> u32 {
        self.entries.get(key).map_or(0, |e| e.ref_count)
    }

    #[must_use]
    pub fn key_for_path(&self, path: &str) -> Option<K> {
        self.lookup.get(path).copied()
    }

    #[must_use]
    pub fn contains_key(&self, key: K) -> bool {
        self.entries.contains_key(key)
    }

    /// Number of live resources, including unregistered ones.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of path-registered resources.
    #[must_use]
    pub fn registered_paths(&self) -> usize {
        self.lookup.len()
    }
}
