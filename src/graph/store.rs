//! GraphStore: the in-memory node/edge set with dedup indices

use super::edge::{Edge, EdgeKey};
use super::node::{Node, NodeId};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::warn;

/// The full persisted state: nodes and edges in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Graph {
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub edges: Vec<Edge>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }
}

/// Outcome of [`GraphStore::insert_edge`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EdgeInsert {
    /// The edge was stored
    Added,
    /// An edge with the same `(source, target, label)` already exists
    Duplicate,
    /// The named endpoint is not in the store; nothing was stored
    MissingEndpoint(NodeId),
}

impl EdgeInsert {
    pub fn is_added(&self) -> bool {
        matches!(self, EdgeInsert::Added)
    }
}

/// In-memory graph with O(1) membership checks.
///
/// Invariants held at all times:
/// - no two nodes share an id (first write wins, bodies are never rewritten)
/// - no two edges share a `(source, target, label)` key
/// - every edge endpoint is a stored node
///
/// The indices are built once in [`GraphStore::from_graph`] and maintained
/// incrementally by the upserts.
#[derive(Debug, Clone, Default)]
pub struct GraphStore {
    graph: Graph,
    /// Node id → position in `graph.nodes`
    node_index: HashMap<NodeId, usize>,
    edge_index: HashSet<EdgeKey>,
}

impl GraphStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from a loaded snapshot.
    ///
    /// A snapshot that was edited by hand may break the invariants. Later
    /// duplicate nodes, duplicate edges and dangling edges are dropped so the
    /// next save writes a valid graph.
    pub fn from_graph(graph: Graph) -> Self {
        let mut store = Self {
            graph: Graph {
                nodes: Vec::with_capacity(graph.nodes.len()),
                edges: Vec::with_capacity(graph.edges.len()),
            },
            node_index: HashMap::with_capacity(graph.nodes.len()),
            edge_index: HashSet::with_capacity(graph.edges.len()),
        };

        let mut duplicate_nodes = 0usize;
        for node in graph.nodes {
            if !store.upsert_node(node) {
                duplicate_nodes += 1;
            }
        }

        let mut duplicate_edges = 0usize;
        let mut dangling_edges = 0usize;
        for edge in graph.edges {
            match store.insert_edge(edge) {
                EdgeInsert::Added => {}
                EdgeInsert::Duplicate => duplicate_edges += 1,
                EdgeInsert::MissingEndpoint(_) => dangling_edges += 1,
            }
        }

        if duplicate_nodes + duplicate_edges + dangling_edges > 0 {
            warn!(
                duplicate_nodes,
                duplicate_edges,
                dangling_edges,
                "repaired snapshot while building indices"
            );
        }
        store
    }

    pub fn has_node(&self, id: &NodeId) -> bool {
        self.node_index.contains_key(id)
    }

    pub fn has_edge(&self, source: &NodeId, target: &NodeId, label: &str) -> bool {
        self.edge_index
            .contains(&EdgeKey::new(source.clone(), target.clone(), label))
    }

    /// Get a node by id
    pub fn node(&self, id: &NodeId) -> Option<&Node> {
        self.node_index.get(id).map(|&i| &self.graph.nodes[i])
    }

    /// Insert the node unless its id is already stored.
    ///
    /// Returns `true` when the node was added. An existing node body is
    /// never replaced.
    pub fn upsert_node(&mut self, node: Node) -> bool {
        if self.node_index.contains_key(&node.id) {
            return false;
        }
        self.node_index.insert(node.id.clone(), self.graph.nodes.len());
        self.graph.nodes.push(node);
        true
    }

    /// Insert the edge if both endpoints exist and its key is new.
    ///
    /// Returns `true` when the edge was added.
    pub fn upsert_edge(&mut self, edge: Edge) -> bool {
        self.insert_edge(edge).is_added()
    }

    /// Like [`GraphStore::upsert_edge`], reporting why an edge was not stored.
    pub fn insert_edge(&mut self, edge: Edge) -> EdgeInsert {
        if !self.has_node(&edge.source) {
            return EdgeInsert::MissingEndpoint(edge.source);
        }
        if !self.has_node(&edge.target) {
            return EdgeInsert::MissingEndpoint(edge.target);
        }
        if !self.edge_index.insert(edge.key()) {
            return EdgeInsert::Duplicate;
        }
        self.graph.edges.push(edge);
        EdgeInsert::Added
    }

    /// The current full state, for persistence
    pub fn snapshot(&self) -> &Graph {
        &self.graph
    }

    /// Consume the store, returning the graph
    pub fn into_graph(self) -> Graph {
        self.graph
    }

    /// Get all nodes in insertion order
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.graph.nodes.iter()
    }

    /// Get all edges in insertion order
    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.graph.edges.iter()
    }

    pub fn node_count(&self) -> usize {
        self.graph.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edges.len()
    }
}
