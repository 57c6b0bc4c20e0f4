//! Ingest pipeline: snapshot → sources → merge engine → snapshot
//!
//! The pipeline owns the in-memory graph for the length of a run. It is
//! loaded from the snapshot store when the pipeline is opened, every source
//! record is merged into it in delivery order, and it is written back only
//! when [`IngestPipeline::commit`] is called. A failed source therefore
//! never touches the persisted snapshot.

use crate::graph::{Graph, GraphStore};
use crate::merge::{MergeEngine, MergeStats};
use crate::source::{RecordSource, SourceError};
use crate::storage::{SnapshotStore, StorageError};
use thiserror::Error;
use tracing::info;

/// Errors that abort a run
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("source failed: {0}")]
    Source(#[from] SourceError),

    #[error("could not save snapshot: {0}")]
    Storage(#[from] StorageError),
}

/// Drives record sources into one graph backed by a snapshot store.
pub struct IngestPipeline<S: SnapshotStore> {
    store: S,
    graph: GraphStore,
    engine: MergeEngine,
}

impl<S: SnapshotStore> IngestPipeline<S> {
    /// Load the current snapshot (failing open) and prepare to merge into it.
    pub fn open(store: S, engine: MergeEngine) -> Self {
        let graph = GraphStore::from_graph(store.load());
        Self {
            store,
            graph,
            engine,
        }
    }

    /// Merge every record `source` delivers. Returns the number of records.
    pub fn run(&mut self, source: &mut dyn RecordSource) -> Result<usize, IngestError> {
        let engine = &mut self.engine;
        let graph = &mut self.graph;
        let before = *engine.stats();

        info!(source = source.id(), "ingest started");
        let delivered = source.process(&mut |raw| {
            engine.ingest_raw(&raw, graph);
        })?;

        let after = engine.stats();
        info!(
            source = source.id(),
            records = delivered,
            skipped = after.skipped - before.skipped,
            nodes_added = after.nodes_added - before.nodes_added,
            edges_added = after.edges_added - before.edges_added,
            edges_dropped = after.edges_dropped - before.edges_dropped,
            "ingest finished"
        );
        Ok(delivered)
    }

    /// The graph as it currently stands in memory
    pub fn graph(&self) -> &GraphStore {
        &self.graph
    }

    /// Totals across every run on this pipeline
    pub fn stats(&self) -> &MergeStats {
        self.engine.stats()
    }

    /// Write the graph back to the snapshot store and return it.
    pub fn commit(self) -> Result<Graph, IngestError> {
        let pending = self.engine.pending_edges();
        if pending > 0 {
            info!(pending, "edges still waiting for an endpoint are discarded");
        }
        self.store.write(self.graph.snapshot())?;
        info!(
            nodes = self.graph.node_count(),
            edges = self.graph.edge_count(),
            "snapshot saved"
        );
        Ok(self.graph.into_graph())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{RawRecord, RecordKind};
    use crate::storage::{JsonSnapshotStore, OpenStore};
    use serde_json::json;

    /// Replays a fixed list of records, optionally failing afterwards.
    struct Replay {
        records: Vec<RawRecord>,
        fail: bool,
    }

    impl RecordSource for Replay {
        fn id(&self) -> &str {
            "replay"
        }

        fn process(&mut self, sink: &mut dyn FnMut(RawRecord)) -> Result<usize, SourceError> {
            for r in &self.records {
                sink(r.clone());
            }
            if self.fail {
                return Err(SourceError::Malformed("upstream went away".to_string()));
            }
            Ok(self.records.len())
        }
    }

    fn records() -> Vec<RawRecord> {
        vec![
            RawRecord::from_value(
                RecordKind::Committee,
                json!({"committee_id": "C001", "name": "Friends of Jane"}),
            ),
            RawRecord::from_value(
                RecordKind::Contribution,
                json!({
                    "contributor_name": "Jane Doe",
                    "committee_id": "C001",
                    "contribution_receipt_amount": 500,
                    "contribution_receipt_date": "2024-01-01"
                }),
            ),
        ]
    }

    #[test]
    fn commit_persists_merged_graph() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("graph.json");

        let store = JsonSnapshotStore::open(&path).unwrap();
        let mut pipeline = IngestPipeline::open(store, MergeEngine::new());
        let mut source = Replay {
            records: records(),
            fail: false,
        };
        assert_eq!(pipeline.run(&mut source).unwrap(), 2);
        assert_eq!(pipeline.stats().records, 2);
        let graph = pipeline.commit().unwrap();

        assert_eq!(graph.nodes.len(), 2);
        assert_eq!(graph.edges.len(), 1);
        let reloaded = JsonSnapshotStore::open(&path).unwrap().load();
        assert_eq!(reloaded, graph);
    }

    #[test]
    fn second_run_over_same_snapshot_adds_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("graph.json");

        for _ in 0..2 {
            let store = JsonSnapshotStore::open(&path).unwrap();
            let mut pipeline = IngestPipeline::open(store, MergeEngine::new());
            pipeline
                .run(&mut Replay {
                    records: records(),
                    fail: false,
                })
                .unwrap();
            pipeline.commit().unwrap();
        }

        let store = JsonSnapshotStore::open(&path).unwrap();
        let mut pipeline = IngestPipeline::open(store, MergeEngine::new());
        pipeline
            .run(&mut Replay {
                records: records(),
                fail: false,
            })
            .unwrap();
        assert_eq!(pipeline.stats().nodes_added, 0);
        assert_eq!(pipeline.stats().edges_added, 0);
        assert_eq!(pipeline.graph().node_count(), 2);
    }

    #[test]
    fn failed_source_leaves_snapshot_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("graph.json");

        let store = JsonSnapshotStore::open(&path).unwrap();
        let mut pipeline = IngestPipeline::open(store, MergeEngine::new());
        let result = pipeline.run(&mut Replay {
            records: records(),
            fail: true,
        });

        assert!(matches!(result, Err(IngestError::Source(_))));
        assert!(!path.exists());
    }
}
