use ahash::AHashMap;
use anyhow::Result;
use std::borrow::Borrow;
use std::collections::hash_map::Entry::{Occupied, Vacant};
use std::hash::Hash;

/// A simple cache that stores the result of a fallible function call.
///
/// Failed loads are not stored, so the next lookup of the same key retries.
pub struct Cache<Key: Hash + Eq, Value> {
    items: AHashMap<Key, Value>,
}

impl<Key: Hash + Eq, Value> Cache<Key, Value> {
    pub fn new() -> Self {
        Self {
            items: AHashMap::new(),
        }
    }

    pub fn get_or_try_insert_with_key<F: FnOnce(&Key) -> Result<Value>>(
        &mut self,
        key: Key,
        loader: F,
    ) -> Result<&Value> {
        let value_ref = match self.items.entry(key) {
            Occupied(entry) => entry.into_mut(),
            Vacant(entry) => {
                let value = loader(entry.key())?;
                entry.insert(value)
            }
        };
        Ok(value_ref)
    }

    pub fn get<Q>(&self, key: &Q) -> Option<&Value>
    where
        Key: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.items.get(key)
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        Key: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.items.contains_key(key)
    }

    pub fn remove<Q>(&mut self, key: &Q) -> Option<Value>
    where
        Key: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.items.remove(key)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Removes every entry, returning the values so the caller can release them.
    pub fn drain(&mut self) -> impl Iterator<Item = Value> + '_ {
        self.items.drain().map(|(_, value)| value)
    }
}

impl<Key: Hash + Eq, Value> Default for Cache<Key, Value> {
    fn default() -> Self {
        Self::new()
    }
}
