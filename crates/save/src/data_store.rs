//! Keyed blob store the host keeps inside each save.

use std::collections::BTreeMap;

use bevy::prelude::*;

/// Access to the host's per-save keyed byte blobs.
pub trait DataStore {
    fn get(&self, key: &str) -> Option<&[u8]>;
    fn put(&mut self, key: &str, data: Vec<u8>);
    fn remove(&mut self, key: &str) -> Option<Vec<u8>>;

    fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }
}

/// In-memory store. `BTreeMap` keeps key iteration deterministic.
#[derive(Resource, Debug, Clone, Default, PartialEq, Eq)]
pub struct SerializableData {
    entries: BTreeMap<String, Vec<u8>>,
}

impl SerializableData {
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl DataStore for SerializableData {
    fn get(&self, key: &str) -> Option<&[u8]> {
        self.entries.get(key).map(Vec::as_slice)
    }

    fn put(&mut self, key: &str, data: Vec<u8>) {
        self.entries.insert(key.to_owned(), data);
    }

    fn remove(&mut self, key: &str) -> Option<Vec<u8>> {
        self.entries.remove(key)
    }
}
