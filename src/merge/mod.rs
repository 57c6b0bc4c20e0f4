//! Merge engine: folds normalized records into the graph store
//!
//! One handler per record kind; the only state shared across records is the
//! [`GraphStore`](crate::graph::GraphStore) passed into every call, plus the
//! engine's optional deferred-edge queue.

mod engine;
mod outcome;
mod pending;

pub use engine::MergeEngine;
pub use outcome::{MergeOutcome, MergeStats, Rejection, RejectionReason};
pub use pending::PendingEdges;
