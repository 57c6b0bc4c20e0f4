//! MergeEngine: record-kind handlers over a shared GraphStore

use super::outcome::{MergeOutcome, MergeStats, RejectionReason};
use super::pending::PendingEdges;
use crate::graph::{Attribute, Edge, GraphStore, Node, NodeId, NodeType};
use crate::record::{
    normalize, CandidateRecord, CommitteeRecord, ContributionRecord, EntityKey, NormalizedRecord,
    RawRecord,
};
use tracing::debug;

/// Upstream entity-type codes for contributors that are themselves committees.
const COMMITTEE_ENTITY_TYPES: &[&str] = &["COM", "PAC", "PTY", "CCM"];

/// Folds normalized records into a [`GraphStore`].
///
/// Ordering matters. A support edge is only stored when its candidate is
/// already a node, so candidates must be ingested before committees; a
/// contribution to a bare committee id only links to a committee that is
/// already present. Edges that miss an endpoint are dropped, unless
/// [`MergeEngine::with_deferred_edges`] is used, in which case they are
/// parked and stored as soon as the missing node is inserted.
#[derive(Debug, Default)]
pub struct MergeEngine {
    pending: Option<PendingEdges>,
    stats: MergeStats,
}

impl MergeEngine {
    /// Create an engine that drops edges with unknown endpoints
    pub fn new() -> Self {
        Self::default()
    }

    /// Park edges with unknown endpoints and retry them when the node appears
    pub fn with_deferred_edges(mut self) -> Self {
        self.pending = Some(PendingEdges::new());
        self
    }

    /// Merge one record into `store`.
    pub fn ingest(&mut self, record: &NormalizedRecord, store: &mut GraphStore) -> MergeOutcome {
        let mut merge = Merge {
            store,
            pending: self.pending.as_mut(),
            outcome: MergeOutcome::empty(),
            source: record.source(),
        };
        match record {
            NormalizedRecord::Candidate(r) => merge.candidate(r),
            NormalizedRecord::Committee(r) => merge.committee(r),
            NormalizedRecord::Contribution(r) => merge.contribution(r),
        }
        let outcome = merge.outcome;
        self.stats.absorb(&outcome);
        outcome
    }

    /// Normalize and merge a raw record.
    pub fn ingest_raw(&mut self, record: &RawRecord, store: &mut GraphStore) -> MergeOutcome {
        self.ingest(&normalize(record), store)
    }

    /// Totals since the engine was created
    pub fn stats(&self) -> &MergeStats {
        &self.stats
    }

    /// Number of edges still waiting for an endpoint
    pub fn pending_edges(&self) -> usize {
        self.pending.as_ref().map_or(0, PendingEdges::len)
    }
}

/// Mutation context for a single record.
struct Merge<'a> {
    store: &'a mut GraphStore,
    pending: Option<&'a mut PendingEdges>,
    outcome: MergeOutcome,
    source: Option<&'a str>,
}

impl Merge<'_> {
    fn candidate(&mut self, record: &CandidateRecord) {
        let Some(id) = self.resolve(record.entity_key(), "candidate") else {
            return;
        };
        let label = record.name.clone().unwrap_or_else(|| id.to_string());
        let node = Node::new(id, label, NodeType::Campaign)
            .with_attributes(record.attributes.iter().cloned())
            .with_attributes(self.source_attribute());
        self.add_node(node);
    }

    fn committee(&mut self, record: &CommitteeRecord) {
        let Some(id) = self.resolve(record.entity_key(), "committee") else {
            return;
        };
        let label = record.name.clone().unwrap_or_else(|| id.to_string());
        let node = Node::new(id.clone(), label, NodeType::Campaign)
            .with_attributes(record.attributes.iter().cloned())
            .with_attributes(self.source_attribute());
        self.add_node(node);

        for candidate in &record.candidate_ids {
            self.add_edge(Edge::support(id.clone(), NodeId::from(candidate.as_str())));
        }
    }

    fn contribution(&mut self, record: &ContributionRecord) {
        let Some(contributor) = self.resolve(record.contributor.entity_key(), "contributor") else {
            return;
        };

        let committee = EntityKey::Committee {
            committee_id: record.committee_id.as_deref(),
            name: record.committee_name.as_deref(),
        }
        .resolve();
        let candidate = EntityKey::Candidate {
            candidate_id: record.candidate_id.as_deref(),
        }
        .resolve();
        if committee.is_none() && candidate.is_none() {
            self.skip("recipient");
            return;
        }

        let contributor_node = self.contributor_node(contributor.clone(), record);
        self.add_node(contributor_node);

        let recipients = [
            (committee, record.committee_name.as_deref()),
            (candidate, record.candidate_name.as_deref()),
        ];
        for (target, name) in recipients {
            let Some(target) = target else { continue };
            // Only a named recipient can be introduced; a bare id must already exist.
            if let Some(name) = name {
                let node = Node::new(target.clone(), name, NodeType::Campaign)
                    .with_attributes(self.source_attribute());
                self.add_node(node);
            }
            self.add_edge(Edge::contribution(
                contributor.clone(),
                target,
                record.amount.clone(),
                record.date.clone(),
            ));
        }
    }

    fn contributor_node(&self, id: NodeId, record: &ContributionRecord) -> Node {
        let fields = &record.contributor;
        let node_type = match fields.entity_type.as_deref() {
            Some(code) if COMMITTEE_ENTITY_TYPES.contains(&code.to_ascii_uppercase().as_str()) => {
                NodeType::Campaign
            }
            _ => NodeType::Individual,
        };
        let label = fields.name.clone().unwrap_or_else(|| id.to_string());
        let attributes = [
            ("city", &fields.city),
            ("address", &fields.address),
            ("employer", &fields.employer),
            ("occupation", &fields.occupation),
        ]
        .into_iter()
        .filter_map(|(key, value)| value.as_ref().map(|v| Attribute::new(key, v.as_str())));

        Node::new(id, label, node_type)
            .with_attributes(attributes)
            .with_attributes(self.source_attribute())
    }

    fn source_attribute(&self) -> Option<Attribute> {
        self.source.map(|s| Attribute::new("source", s))
    }

    fn resolve(&mut self, key: EntityKey<'_>, role: &'static str) -> Option<NodeId> {
        let id = key.resolve();
        if id.is_none() {
            self.skip(role);
        }
        id
    }

    fn skip(&mut self, role: &'static str) {
        debug!(role, "skipping record without identifier");
        self.outcome.skipped = true;
        self.outcome
            .reject(format!("{} record", role), RejectionReason::MissingIdentity(role));
    }

    fn add_node(&mut self, node: Node) {
        let id = node.id.clone();
        if !self.store.upsert_node(node) {
            return;
        }
        self.outcome.nodes_added += 1;

        let waiting = match self.pending.as_deref_mut() {
            Some(pending) => pending.take(&id),
            None => return,
        };
        for edge in waiting {
            self.add_edge(edge);
        }
    }

    fn add_edge(&mut self, edge: Edge) {
        let missing = [&edge.source, &edge.target]
            .into_iter()
            .find(|id| !self.store.has_node(id))
            .cloned();

        let Some(missing) = missing else {
            if self.store.upsert_edge(edge) {
                self.outcome.edges_added += 1;
            }
            return;
        };

        if let Some(pending) = self.pending.as_deref_mut() {
            if pending.park(missing, edge) {
                self.outcome.edges_deferred += 1;
            }
            return;
        }
        debug!(edge = %edge.key(), %missing, "dropping edge with unknown endpoint");
        self.outcome
            .reject(edge.key().to_string(), RejectionReason::MissingEndpoint(missing));
    }
}
