//! Directed, labeled relationships between nodes

use super::node::{find_attribute, Attribute, NodeId};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Label used for donor → recipient edges
pub const CONTRIBUTED_TO: &str = "contributed_to";

/// Label used for committee → candidate edges
pub const SUPPORTS: &str = "supports";

/// Kind of relationship an edge records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EdgeType {
    /// Money moved from source to target
    Contribution,
    /// A committee declared it supports a candidate
    Support,
}

/// Identity of an edge: at most one edge per `(source, target, label)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EdgeKey {
    pub source: NodeId,
    pub target: NodeId,
    pub label: String,
}

impl EdgeKey {
    pub fn new(source: NodeId, target: NodeId, label: impl Into<String>) -> Self {
        Self {
            source,
            target,
            label: label.into(),
        }
    }
}

impl std::fmt::Display for EdgeKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -[{}]-> {}", self.source, self.label, self.target)
    }
}

/// A directed edge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    /// Source node
    pub source: NodeId,
    /// Target node
    pub target: NodeId,
    /// Relationship label (e.g., "contributed_to", "supports")
    pub label: String,
    /// Relationship kind
    #[serde(rename = "type")]
    pub edge_type: EdgeType,
    /// Ordered attributes
    #[serde(default)]
    pub attributes: Vec<Attribute>,
}

impl Edge {
    /// Create a new edge with no attributes
    pub fn new(
        source: NodeId,
        target: NodeId,
        label: impl Into<String>,
        edge_type: EdgeType,
    ) -> Self {
        Self {
            source,
            target,
            label: label.into(),
            edge_type,
            attributes: Vec::new(),
        }
    }

    /// A `contributed_to` edge carrying amount and date exactly as the source gave them.
    pub fn contribution(source: NodeId, target: NodeId, amount: Value, date: Value) -> Self {
        Self::new(source, target, CONTRIBUTED_TO, EdgeType::Contribution)
            .with_attribute("amount", amount)
            .with_attribute("date", date)
    }

    /// A `supports` edge from a committee to a candidate.
    pub fn support(committee: NodeId, candidate: NodeId) -> Self {
        Self::new(committee, candidate, SUPPORTS, EdgeType::Support)
    }

    /// Append an attribute
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.push(Attribute::new(key, value));
        self
    }

    /// The dedup key of this edge
    pub fn key(&self) -> EdgeKey {
        EdgeKey::new(self.source.clone(), self.target.clone(), self.label.clone())
    }

    /// Value of the first attribute named `key`
    pub fn attribute(&self, key: &str) -> Option<&Value> {
        find_attribute(&self.attributes, key)
    }
}
