//! Value provenance tracking.
//!
//! For every collection, remembers which tag wrote each leaf so a conflict can
//! name both sides. Entries are only ever added.

use std::collections::HashMap;

use serde_json::Value;

use super::conflict::Provenance;

/// Maximum nesting the fallback search descends into.
const MAX_FALLBACK_DEPTH: usize = 32;

/// Key segments from the collection root down to a node.
///
/// Kept as separate segments so a key containing a dot never shares an
/// entry with a nested path of the same spelling.
pub type KeyPath = [String];

#[derive(Debug, Default)]
pub struct ProvenanceTracker {
    /// collection → key path → writer of the leaf at that path.
    leaves: HashMap<String, HashMap<Vec<String>, Provenance>>,
    /// collection → key path → tag that first created the object there.
    containers: HashMap<String, HashMap<Vec<String>, Provenance>>,
}

impl ProvenanceTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the writer of a leaf value.
    pub fn record(&mut self, collection: &str, path: &KeyPath, provenance: Provenance) {
        self.leaves
            .entry(collection.to_string())
            .or_default()
            .insert(path.to_vec(), provenance);
    }

    /// Record the tag that created an object node, unless one is known already.
    pub fn record_container(&mut self, collection: &str, path: &KeyPath, provenance: Provenance) {
        self.containers
            .entry(collection.to_string())
            .or_default()
            .entry(path.to_vec())
            .or_insert(provenance);
    }

    /// Direct lookup of the leaf written at `path`.
    pub fn get(&self, collection: &str, path: &KeyPath) -> Option<&Provenance> {
        self.leaves.get(collection)?.get(path)
    }

    /// Find who owns the node `value` currently stored at `path`.
    ///
    /// Leaves are answered from the index directly. Object nodes have no leaf
    /// entry of their own, so their subtree is searched for the first leaf
    /// with a recorded writer; an object with no such leaf falls back to the
    /// tag that created it.
    pub fn owner(&self, collection: &str, path: &KeyPath, value: &Value) -> Option<&Provenance> {
        if let Some(provenance) = self.get(collection, path) {
            return Some(provenance);
        }
        let mut scratch = path.to_vec();
        self.find_in_subtree(collection, &mut scratch, value, 0)
            .or_else(|| self.containers.get(collection)?.get(path))
    }

    fn find_in_subtree(
        &self,
        collection: &str,
        path: &mut Vec<String>,
        value: &Value,
        depth: usize,
    ) -> Option<&Provenance> {
        if depth >= MAX_FALLBACK_DEPTH {
            return None;
        }
        let Value::Object(map) = value else {
            return None;
        };
        for (key, child) in map {
            path.push(key.clone());
            let found = self
                .get(collection, path)
                .or_else(|| self.find_in_subtree(collection, path, child, depth + 1));
            path.pop();
            if found.is_some() {
                return found;
            }
        }
        None
    }
}

/// Dotted rendering of a key path, as shown in conflict reports.
pub fn dotted(path: &KeyPath) -> String {
    path.join(".")
}
