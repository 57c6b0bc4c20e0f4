//! Per-record merge results and run totals

use crate::graph::NodeId;

/// Why part (or all) of a record did not reach the graph.
#[derive(Debug, Clone, PartialEq)]
pub enum RejectionReason {
    /// No identifier could be formed for a required participant; the
    /// whole record was skipped
    MissingIdentity(&'static str),
    /// Edge references a node that is not in the store
    MissingEndpoint(NodeId),
}

impl std::fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingIdentity(role) => write!(f, "no identifier for {}", role),
            Self::MissingEndpoint(id) => write!(f, "missing endpoint {}", id),
        }
    }
}

/// A single rejected item from a record.
#[derive(Debug, Clone, PartialEq)]
pub struct Rejection {
    /// Human-readable description of what was rejected
    pub description: String,
    /// Why it was rejected
    pub reason: RejectionReason,
}

impl Rejection {
    pub fn new(description: impl Into<String>, reason: RejectionReason) -> Self {
        Self {
            description: description.into(),
            reason,
        }
    }
}

/// The result of ingesting one record.
///
/// Partial success is normal: a contributor node may be added while its
/// edge to an unknown committee is rejected.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MergeOutcome {
    pub nodes_added: usize,
    pub edges_added: usize,
    /// Edges parked until a missing endpoint appears
    pub edges_deferred: usize,
    /// True when the record was dropped without touching the store
    pub skipped: bool,
    pub rejections: Vec<Rejection>,
}

impl MergeOutcome {
    pub fn empty() -> Self {
        Self::default()
    }

    /// True if nothing was added, deferred or rejected
    pub fn is_noop(&self) -> bool {
        self.nodes_added == 0
            && self.edges_added == 0
            && self.edges_deferred == 0
            && self.rejections.is_empty()
    }

    /// True if no items were rejected
    pub fn is_fully_committed(&self) -> bool {
        self.rejections.is_empty()
    }

    pub(crate) fn reject(&mut self, description: impl Into<String>, reason: RejectionReason) {
        self.rejections.push(Rejection::new(description, reason));
    }
}

/// Totals accumulated across a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeStats {
    pub records: usize,
    pub skipped: usize,
    pub nodes_added: usize,
    pub edges_added: usize,
    pub edges_dropped: usize,
    pub edges_deferred: usize,
}

impl MergeStats {
    pub fn absorb(&mut self, outcome: &MergeOutcome) {
        self.records += 1;
        if outcome.skipped {
            self.skipped += 1;
        }
        self.nodes_added += outcome.nodes_added;
        self.edges_added += outcome.edges_added;
        self.edges_deferred += outcome.edges_deferred;
        self.edges_dropped += outcome
            .rejections
            .iter()
            .filter(|r| matches!(r.reason, RejectionReason::MissingEndpoint(_)))
            .count();
    }
}
