//! Edges waiting for a missing endpoint

use crate::graph::{Edge, EdgeKey, NodeId};
use std::collections::{HashMap, HashSet};

/// Edges parked under the id of the node they are waiting for.
///
/// Each edge key is parked at most once; the first parked body wins, the
/// same rule the store applies to edges.
#[derive(Debug, Clone, Default)]
pub struct PendingEdges {
    by_missing: HashMap<NodeId, Vec<Edge>>,
    keys: HashSet<EdgeKey>,
}

impl PendingEdges {
    pub fn new() -> Self {
        Self::default()
    }

    /// Park `edge` until `missing` is inserted. Returns `false` if an edge
    /// with the same key is already waiting.
    pub fn park(&mut self, missing: NodeId, edge: Edge) -> bool {
        if !self.keys.insert(edge.key()) {
            return false;
        }
        self.by_missing.entry(missing).or_default().push(edge);
        true
    }

    /// Remove and return every edge waiting for `id`.
    pub fn take(&mut self, id: &NodeId) -> Vec<Edge> {
        let edges = self.by_missing.remove(id).unwrap_or_default();
        for edge in &edges {
            self.keys.remove(&edge.key());
        }
        edges
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}
