//! Storage trait definitions

use crate::graph::Graph;
use std::path::Path;
use thiserror::Error;
use tracing::{info, warn};

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to replace snapshot: {0}")]
    Persist(#[from] tempfile::PersistError),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for snapshot persistence backends
///
/// A snapshot is the whole graph; there is no partial persistence. `write`
/// must leave either the previous snapshot or the new one in place, never a
/// truncated mix.
pub trait SnapshotStore {
    /// Read the persisted graph. `Ok(None)` means no snapshot exists yet.
    fn read(&self) -> StorageResult<Option<Graph>>;

    /// Replace the persisted graph.
    fn write(&self, graph: &Graph) -> StorageResult<()>;

    /// Load the persisted graph, failing open.
    ///
    /// A missing, unreadable or malformed snapshot yields an empty graph.
    fn load(&self) -> Graph {
        match self.read() {
            Ok(Some(graph)) => {
                info!(
                    nodes = graph.nodes.len(),
                    edges = graph.edges.len(),
                    "loaded snapshot"
                );
                graph
            }
            Ok(None) => {
                info!("no snapshot found, starting new graph");
                Graph::new()
            }
            Err(e) => {
                warn!(error = %e, "could not read snapshot, starting new graph");
                Graph::new()
            }
        }
    }
}

/// Extension trait for opening stores from paths
pub trait OpenStore: SnapshotStore + Sized {
    /// Open a store at the given path. The file need not exist.
    fn open(path: impl AsRef<Path>) -> StorageResult<Self>;
}
