//! Shared fixtures for the integration tests
//!
//! Record builders in the FEC field shape, plus a checker for the graph
//! invariants every snapshot must satisfy.

#![allow(dead_code)]

use donorgraph::{Graph, RawRecord, RecordKind};
use serde_json::{json, Value};
use std::collections::HashSet;

pub fn candidate(id: &str, name: &str) -> RawRecord {
    RawRecord::from_value(
        RecordKind::Candidate,
        json!({"candidate_id": id, "name": name, "election_years": [2024]}),
    )
    .with_source("FEC")
}

pub fn committee(id: &str, name: &str, candidate_ids: &[&str]) -> RawRecord {
    RawRecord::from_value(
        RecordKind::Committee,
        json!({"committee_id": id, "name": name, "candidate_ids": candidate_ids}),
    )
    .with_source("FEC")
}

/// A receipt naming only the committee id, as Schedule A rows often do.
pub fn contribution(name: &str, committee_id: &str, amount: Value, date: &str) -> RawRecord {
    RawRecord::from_value(
        RecordKind::Contribution,
        json!({
            "contributor_name": name,
            "contributor_employer": "Acme",
            "committee_id": committee_id,
            "contribution_receipt_amount": amount,
            "contribution_receipt_date": date
        }),
    )
    .with_source("FEC")
}

/// A TRACER-shaped contribution row with name-only recipient.
pub fn tracer_contribution(
    name: &str,
    address: &str,
    committee_name: &str,
    amount: &str,
) -> RawRecord {
    RawRecord::from_value(
        RecordKind::Contribution,
        json!({
            "ContributorName": name,
            "ContributorAddress": address,
            "CommitteeName": committee_name,
            "Amount": amount,
            "Date": "2024-03-01"
        }),
    )
    .with_source("TRACER")
}

/// Panic unless node ids are unique, edge keys are unique and every edge
/// endpoint is a node.
pub fn assert_invariants(graph: &Graph) {
    let mut ids = HashSet::new();
    for node in &graph.nodes {
        assert!(ids.insert(node.id.clone()), "duplicate node {}", node.id);
    }

    let mut keys = HashSet::new();
    for edge in &graph.edges {
        assert!(keys.insert(edge.key()), "duplicate edge {}", edge.key());
        assert!(ids.contains(&edge.source), "dangling source {}", edge.key());
        assert!(ids.contains(&edge.target), "dangling target {}", edge.key());
    }
}
