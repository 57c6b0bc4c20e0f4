//! JSON file snapshot backend

use super::traits::{OpenStore, SnapshotStore, StorageResult};
use crate::graph::Graph;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

/// A graph snapshot kept as one pretty-printed JSON document.
///
/// Writes go to a temporary file next to the snapshot which is then renamed
/// over it, so a crash mid-write leaves the previous snapshot intact.
#[derive(Debug, Clone)]
pub struct JsonSnapshotStore {
    path: PathBuf,
}

impl JsonSnapshotStore {
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn directory(&self) -> &Path {
        match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        }
    }
}

impl OpenStore for JsonSnapshotStore {
    fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        Ok(Self {
            path: path.as_ref().to_path_buf(),
        })
    }
}

impl SnapshotStore for JsonSnapshotStore {
    fn read(&self) -> StorageResult<Option<Graph>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let bytes = fs::read(&self.path)?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(None);
        }
        Ok(Some(serde_json::from_slice(&bytes)?))
    }

    fn write(&self, graph: &Graph) -> StorageResult<()> {
        let dir = self.directory();
        fs::create_dir_all(dir)?;

        let mut bytes = serde_json::to_vec_pretty(graph)?;
        bytes.push(b'\n');

        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(&bytes)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path)?;

        debug!(
            path = %self.path.display(),
            nodes = graph.nodes.len(),
            edges = graph.edges.len(),
            "wrote snapshot"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Edge, Node, NodeId, NodeType};
    use serde_json::json;

    fn sample_graph() -> Graph {
        Graph {
            nodes: vec![
                Node::new("C001", "Friends of Jane", NodeType::Campaign),
                Node::new("abc", "Jane Doe", NodeType::Individual)
                    .with_attribute("employer", "Acme")
                    .with_attribute("occupation", json!(null)),
            ],
            edges: vec![Edge::contribution(
                NodeId::from("abc"),
                NodeId::from("C001"),
                json!(500),
                json!("2024-01-01"),
            )],
        }
    }

    #[test]
    fn missing_file_reads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonSnapshotStore::open(dir.path().join("graph.json")).unwrap();
        assert!(store.read().unwrap().is_none());
        assert!(store.load().is_empty());
    }

    #[test]
    fn empty_file_reads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("graph.json");
        fs::write(&path, "  \n").unwrap();

        let store = JsonSnapshotStore::open(&path).unwrap();
        assert!(store.read().unwrap().is_none());
    }

    #[test]
    fn malformed_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("graph.json");
        fs::write(&path, "{\"nodes\": [").unwrap();

        let store = JsonSnapshotStore::open(&path).unwrap();
        assert!(store.read().is_err());
        assert!(store.load().is_empty());
    }

    #[test]
    fn write_then_read_roundtrips() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonSnapshotStore::open(dir.path().join("graph.json")).unwrap();

        let graph = sample_graph();
        store.write(&graph).unwrap();
        assert_eq!(store.load(), graph);
    }

    #[test]
    fn write_creates_missing_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("out").join("graph.json");
        let store = JsonSnapshotStore::open(&path).unwrap();

        store.write(&sample_graph()).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn write_uses_two_space_indent_and_top_level_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("graph.json");
        let store = JsonSnapshotStore::open(&path).unwrap();
        store.write(&sample_graph()).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("{\n  \"nodes\": [\n"));
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert!(value["nodes"].is_array());
        assert!(value["edges"].is_array());
    }

    #[test]
    fn write_leaves_no_temporary_files_behind() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonSnapshotStore::open(dir.path().join("graph.json")).unwrap();
        store.write(&sample_graph()).unwrap();
        store.write(&Graph::new()).unwrap();

        let entries: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
        assert!(store.load().is_empty());
    }
}
