//! End-to-end merge behavior over record sequences

mod common;

use common::{assert_invariants, candidate, committee, contribution, tracer_contribution};
use donorgraph::record::contributor_fingerprint;
use donorgraph::{
    EdgeType, GraphStore, MergeEngine, Node, NodeId, NodeType, RawRecord, RecordKind,
};
use proptest::prelude::*;
use serde_json::json;

fn ingest_all(engine: &mut MergeEngine, store: &mut GraphStore, records: &[RawRecord]) {
    for r in records {
        engine.ingest_raw(r, store);
    }
}

#[test]
fn contribution_to_known_committee_adds_one_node_and_one_edge() {
    let mut store = GraphStore::new();
    store.upsert_node(Node::new("C001", "Friends of Jane", NodeType::Campaign));
    let mut engine = MergeEngine::new();

    let record = contribution("Jane Doe", "C001", json!(500), "2024-01-01");
    let outcome = engine.ingest_raw(&record, &mut store);
    assert_eq!(outcome.nodes_added, 1);
    assert_eq!(outcome.edges_added, 1);

    let jane = NodeId::from(contributor_fingerprint("Jane Doe", ""));
    let node = store.node(&jane).expect("contributor node");
    assert_eq!(node.node_type, NodeType::Individual);
    assert_eq!(node.attribute("employer"), Some(&json!("Acme")));
    assert!(store.has_edge(&jane, &NodeId::from("C001"), "contributed_to"));

    let edge = store.edges().next().unwrap();
    assert_eq!(edge.attribute("amount"), Some(&json!(500)));
    assert_eq!(edge.attribute("date"), Some(&json!("2024-01-01")));

    let again = engine.ingest_raw(&record, &mut store);
    assert!(again.is_noop());
    assert_eq!(store.node_count(), 2);
    assert_eq!(store.edge_count(), 1);
}

#[test]
fn support_edge_requires_candidate_first() {
    let mut store = GraphStore::new();
    let mut engine = MergeEngine::new();
    let pac = committee("C002", "Jane PAC", &["CAND1"]);

    let early = engine.ingest_raw(&pac, &mut store);
    assert_eq!(early.edges_added, 0);
    assert_eq!(store.edge_count(), 0);

    engine.ingest_raw(&candidate("CAND1", "Jane Doe"), &mut store);
    let late = engine.ingest_raw(&pac, &mut store);
    assert_eq!(late.nodes_added, 0);
    assert_eq!(late.edges_added, 1);
    assert!(store.has_edge(&NodeId::from("C002"), &NodeId::from("CAND1"), "supports"));
    assert_eq!(engine.stats().edges_dropped, 1);
}

#[test]
fn deferred_support_edge_lands_when_candidate_arrives() {
    let mut store = GraphStore::new();
    let mut engine = MergeEngine::new().with_deferred_edges();
    let pac = committee("C002", "Jane PAC", &["CAND1"]);

    let early = engine.ingest_raw(&pac, &mut store);
    assert_eq!(early.edges_deferred, 1);
    assert_eq!(engine.pending_edges(), 1);

    let arrival = engine.ingest_raw(&candidate("CAND1", "Jane Doe"), &mut store);
    assert_eq!(arrival.nodes_added, 1);
    assert_eq!(arrival.edges_added, 1);
    assert_eq!(engine.pending_edges(), 0);

    let again = engine.ingest_raw(&pac, &mut store);
    assert!(again.is_noop());
    assert_eq!(store.edge_count(), 1);
    assert_eq!(store.edges().next().unwrap().edge_type, EdgeType::Support);
}

#[test]
fn tracer_rows_share_contributor_and_name_derived_committee() {
    let mut store = GraphStore::new();
    let mut engine = MergeEngine::new();
    ingest_all(
        &mut engine,
        &mut store,
        &[
            tracer_contribution("Bob Smith", "1 Elm St", "Citizens for Parks", "25.00"),
            tracer_contribution("Bob Smith", "1 Elm St", "Citizens for Parks", "40.00"),
            tracer_contribution("Bob Smith", "9 Oak Ave", "Citizens for Parks", "10.00"),
        ],
    );

    // Two distinct addresses, one committee.
    assert_eq!(store.node_count(), 3);
    // Same (source, target, label) keeps only the first amount.
    assert_eq!(store.edge_count(), 2);

    let parks = NodeId::from("committee_Citizens_for_Parks");
    let node = store.node(&parks).expect("committee from name");
    assert_eq!(node.node_type, NodeType::Campaign);
    assert_eq!(node.attribute("source"), Some(&json!("TRACER")));

    let bob = NodeId::from(contributor_fingerprint("Bob Smith", "1 Elm St"));
    let first = store
        .edges()
        .find(|e| e.source == bob)
        .expect("edge from first address");
    assert_eq!(first.attribute("amount"), Some(&json!("25.00")));
}

#[test]
fn contribution_without_contributor_name_is_skipped() {
    let mut store = GraphStore::new();
    store.upsert_node(Node::new("C001", "Friends of Jane", NodeType::Campaign));
    let mut engine = MergeEngine::new();

    let record = RawRecord::from_value(
        RecordKind::Contribution,
        json!({"committee_id": "C001", "contribution_receipt_amount": 10}),
    );
    let outcome = engine.ingest_raw(&record, &mut store);
    assert!(outcome.skipped);
    assert_eq!(store.node_count(), 1);
    assert_eq!(engine.stats().skipped, 1);
}

#[test]
fn contributor_survives_when_bare_committee_is_unknown() {
    let mut store = GraphStore::new();
    let mut engine = MergeEngine::new();

    let outcome = engine.ingest_raw(
        &contribution("Jane Doe", "C404", json!(5), "2024-02-02"),
        &mut store,
    );
    assert_eq!(outcome.nodes_added, 1);
    assert_eq!(outcome.edges_added, 0);
    assert_eq!(store.edge_count(), 0);
    assert_invariants(store.snapshot());
}

// Small pools so sequences collide often.
const NAMES: &[&str] = &["Jane Doe", "Bob Smith", "Ann Lee"];
const COMMITTEES: &[&str] = &["C001", "C002", "C003"];
const CANDIDATES: &[&str] = &["CAND1", "CAND2"];

fn arb_record() -> impl Strategy<Value = RawRecord> {
    let cand = (0..CANDIDATES.len()).prop_map(|i| candidate(CANDIDATES[i], "Candidate"));
    let comm = (0..COMMITTEES.len(), proptest::collection::vec(0..CANDIDATES.len(), 0..3))
        .prop_map(|(i, cs)| {
            let ids: Vec<&str> = cs.into_iter().map(|c| CANDIDATES[c]).collect();
            committee(COMMITTEES[i], "Committee", &ids)
        });
    let contrib = (0..NAMES.len(), 0..COMMITTEES.len(), 1u32..1000).prop_map(|(n, c, amt)| {
        contribution(NAMES[n], COMMITTEES[c], json!(amt), "2024-01-01")
    });
    let tracer = (0..NAMES.len(), 0..COMMITTEES.len()).prop_map(|(n, c)| {
        tracer_contribution(NAMES[n], "1 Elm St", COMMITTEES[c], "5.00")
    });
    let broken = Just(RawRecord::from_value(
        RecordKind::Contribution,
        json!({"contributor_name": "", "committee_id": "C001"}),
    ));
    prop_oneof![cand, comm, contrib, tracer, broken]
}

proptest! {
    #[test]
    fn any_sequence_keeps_graph_invariants(
        records in proptest::collection::vec(arb_record(), 0..40),
        deferred in any::<bool>(),
    ) {
        let mut store = GraphStore::new();
        let mut engine = if deferred {
            MergeEngine::new().with_deferred_edges()
        } else {
            MergeEngine::new()
        };
        ingest_all(&mut engine, &mut store, &records);
        assert_invariants(store.snapshot());
    }

    #[test]
    fn replaying_a_sequence_changes_nothing(
        records in proptest::collection::vec(arb_record(), 0..30),
    ) {
        let mut store = GraphStore::new();
        let mut engine = MergeEngine::new();
        ingest_all(&mut engine, &mut store, &records);
        let first = store.snapshot().clone();

        ingest_all(&mut engine, &mut store, &records);
        let second = store.snapshot();
        // Support edges may appear on replay once their candidate exists;
        // nodes never change.
        prop_assert_eq!(&first.nodes, &second.nodes);
        prop_assert!(first.edges.iter().all(|e| second.edges.contains(e)));
    }

    #[test]
    fn single_record_is_idempotent(record in arb_record()) {
        let mut store = GraphStore::new();
        let mut engine = MergeEngine::new();
        engine.ingest_raw(&record, &mut store);
        let once = store.snapshot().clone();

        let outcome = engine.ingest_raw(&record, &mut store);
        prop_assert!(outcome.nodes_added == 0 && outcome.edges_added == 0);
        prop_assert_eq!(&once, store.snapshot());
    }
}
