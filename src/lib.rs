//! Donorgraph: incremental campaign-finance property graph
//!
//! Merges candidate, committee and contribution records from the FEC API and
//! Colorado TRACER exports into a single deduplicated node/edge graph that is
//! persisted as a JSON snapshot.
//!
//! # Core Concepts
//!
//! - **Nodes**: candidates, committees and contributors, keyed by a stable id
//!   that is inserted at most once (first write wins)
//! - **Edges**: `supports` (committee → candidate) and `contributed_to`
//!   (contributor → committee or candidate), unique per (source, target, label)
//! - **Merge engine**: folds normalized records into the graph in order
//!
//! # Example
//!
//! ```
//! use donorgraph::{GraphStore, MergeEngine, RawRecord, RecordKind};
//! use serde_json::json;
//!
//! let mut store = GraphStore::new();
//! let mut engine = MergeEngine::new();
//! let record = RawRecord::from_value(
//!     RecordKind::Candidate,
//!     json!({"candidate_id": "CAND1", "name": "Jane Doe"}),
//! );
//! engine.ingest_raw(&record, &mut store);
//! engine.ingest_raw(&record, &mut store);
//! assert_eq!(store.node_count(), 1);
//! ```

pub mod config;
pub mod graph;
pub mod ingest;
pub mod merge;
pub mod record;
pub mod source;
pub mod storage;

pub use config::{FecConfig, TracerConfig};
pub use graph::{
    Attribute, Edge, EdgeKey, EdgeType, Graph, GraphStore, Node, NodeId, NodeType,
};
pub use ingest::{IngestError, IngestPipeline};
pub use merge::{MergeEngine, MergeOutcome, MergeStats};
pub use record::{normalize, NormalizedRecord, RawRecord, RecordKind};
pub use source::{FecSource, JsonLinesSource, RecordSource, SourceError, TracerSource};
pub use storage::{JsonSnapshotStore, OpenStore, SnapshotStore, StorageError, StorageResult};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
