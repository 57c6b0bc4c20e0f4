//! Core graph data structures

mod edge;
mod node;
mod store;


pub use edge::{Edge, EdgeKey, EdgeType, CONTRIBUTED_TO, SUPPORTS};
pub use node::{Attribute, Node, NodeId, NodeType};
pub use store::{EdgeInsert, Graph, GraphStore};
