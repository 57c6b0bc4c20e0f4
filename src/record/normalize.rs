//! Field-name reconciliation for raw records
//!
//! Each canonical field has an alias list tried in order. The first alias
//! holding a present value wins; `null`, empty and whitespace-only strings
//! count as missing. Dotted aliases (`committee.name`) walk nested objects.

use super::raw::{RawRecord, RecordKind};
use crate::graph::Attribute;
use serde_json::{Map, Value};

const CANDIDATE_ID: &[&str] = &[
    "candidate_id",
    "CandidateId",
    "CandidateID",
    "FilerId",
    "filer_id",
];
const CANDIDATE_NAME: &[&str] = &[
    "candidate_name",
    "CandidateName",
    "FilerName",
    "filer_name",
    "name",
];

const COMMITTEE_ID: &[&str] = &["committee_id", "CommitteeId", "CommitteeID"];
const COMMITTEE_NAME: &[&str] = &["committee_name", "CommitteeName", "committee.name", "name"];
const SUPPORTED_CANDIDATES: &[&str] = &["candidate_ids", "CandidateIds", "CandidateIDs"];

const CONTRIBUTOR_ID: &[&str] = &["contributor_id", "ContributorId", "ContributorID"];
const CONTRIBUTOR_NAME: &[&str] = &["contributor_name", "ContributorName"];
const CONTRIBUTOR_ADDRESS: &[&str] = &["contributor_address", "ContributorAddress"];
const CONTRIBUTOR_CITY: &[&str] = &["contributor_city", "ContributorCity", "City"];

/// FEC itemized address columns, joined when no single address field exists.
const FEC_ADDRESS_PARTS: &[&str] = &[
    "contributor_street_1",
    "contributor_street_2",
    "contributor_city",
    "contributor_state",
    "contributor_zip",
];
const CONTRIBUTOR_EMPLOYER: &[&str] =
    &["contributor_employer", "ContributorEmployer", "Employer"];
const CONTRIBUTOR_OCCUPATION: &[&str] =
    &["contributor_occupation", "ContributorOccupation", "Occupation"];
const CONTRIBUTOR_ENTITY_TYPE: &[&str] = &["entity_type", "EntityType", "ContributorType"];

const RECIPIENT_COMMITTEE_NAME: &[&str] = &["committee.name", "committee_name", "CommitteeName"];
const RECIPIENT_CANDIDATE_NAME: &[&str] = &["candidate_name", "CandidateName"];

const AMOUNT: &[&str] = &[
    "contribution_receipt_amount",
    "contribution_amount",
    "Amount",
    "amount",
];
const DATE: &[&str] = &["contribution_receipt_date", "contribution_date", "Date", "date"];

/// Descriptive fields copied onto candidate nodes, as (attribute key, aliases).
const CANDIDATE_ATTRIBUTES: &[(&str, &[&str])] = &[
    ("election_years", &["election_years", "ElectionYears"]),
    ("cycles", &["cycles", "Cycles"]),
    ("election_year", &["election_year", "ElectionYear"]),
    ("office", &["office_full", "office", "Office", "OfficeSought"]),
    ("party", &["party_full", "party", "Party"]),
    ("state", &["state", "State"]),
    ("district", &["district", "District"]),
];

const COMMITTEE_ATTRIBUTES: &[(&str, &[&str])] = &[
    ("committee_type", &["committee_type_full", "committee_type", "CommitteeType"]),
    ("designation", &["designation_full", "designation", "Designation"]),
    ("party", &["party_full", "party", "Party"]),
    ("state", &["state", "State"]),
];

/// A candidate filing
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CandidateRecord {
    pub candidate_id: Option<String>,
    pub name: Option<String>,
    /// Election cycle/year and descriptive data, in a fixed order
    pub attributes: Vec<Attribute>,
    pub source: Option<String>,
}

/// A committee registration
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CommitteeRecord {
    pub committee_id: Option<String>,
    pub name: Option<String>,
    /// Candidates the committee declares it supports, deduplicated in order
    pub candidate_ids: Vec<String>,
    pub attributes: Vec<Attribute>,
    pub source: Option<String>,
}

/// The giving side of a contribution
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ContributorFields {
    pub contributor_id: Option<String>,
    pub name: Option<String>,
    /// Name exactly as delivered; the fingerprint hashes this, not `name`
    pub raw_name: Option<String>,
    /// Address field as delivered, or the FEC street/city/state/zip columns
    /// joined by spaces
    pub address: Option<String>,
    pub city: Option<String>,
    pub employer: Option<String>,
    pub occupation: Option<String>,
    /// Upstream entity type code (`IND`, `COM`, `PAC`, ...)
    pub entity_type: Option<String>,
}

/// One itemized receipt
#[derive(Debug, Clone, PartialEq)]
pub struct ContributionRecord {
    pub contributor: ContributorFields,
    pub committee_id: Option<String>,
    pub committee_name: Option<String>,
    pub candidate_id: Option<String>,
    pub candidate_name: Option<String>,
    /// Passed through as delivered; `null` when absent
    pub amount: Value,
    pub date: Value,
    pub source: Option<String>,
}

/// A source-agnostic record, ready for the merge engine
#[derive(Debug, Clone, PartialEq)]
pub enum NormalizedRecord {
    Candidate(CandidateRecord),
    Committee(CommitteeRecord),
    Contribution(ContributionRecord),
}

impl NormalizedRecord {
    pub fn kind(&self) -> RecordKind {
        match self {
            NormalizedRecord::Candidate(_) => RecordKind::Candidate,
            NormalizedRecord::Committee(_) => RecordKind::Committee,
            NormalizedRecord::Contribution(_) => RecordKind::Contribution,
        }
    }

    pub fn source(&self) -> Option<&str> {
        match self {
            NormalizedRecord::Candidate(r) => r.source.as_deref(),
            NormalizedRecord::Committee(r) => r.source.as_deref(),
            NormalizedRecord::Contribution(r) => r.source.as_deref(),
        }
    }
}

/// Reconcile a raw record's field names into its canonical shape.
pub fn normalize(raw: &RawRecord) -> NormalizedRecord {
    let fields = &raw.fields;
    let source = raw.source.clone();
    match raw.kind {
        RecordKind::Candidate => NormalizedRecord::Candidate(CandidateRecord {
            candidate_id: text(fields, CANDIDATE_ID),
            name: text(fields, CANDIDATE_NAME),
            attributes: collect_attributes(fields, CANDIDATE_ATTRIBUTES),
            source,
        }),
        RecordKind::Committee => NormalizedRecord::Committee(CommitteeRecord {
            committee_id: text(fields, COMMITTEE_ID),
            name: text(fields, COMMITTEE_NAME),
            candidate_ids: id_list(fields, SUPPORTED_CANDIDATES),
            attributes: collect_attributes(fields, COMMITTEE_ATTRIBUTES),
            source,
        }),
        RecordKind::Contribution => NormalizedRecord::Contribution(ContributionRecord {
            contributor: ContributorFields {
                contributor_id: text(fields, CONTRIBUTOR_ID),
                name: text(fields, CONTRIBUTOR_NAME),
                raw_name: raw_text(fields, CONTRIBUTOR_NAME),
                address: contributor_address(fields),
                city: text(fields, CONTRIBUTOR_CITY),
                employer: text(fields, CONTRIBUTOR_EMPLOYER),
                occupation: text(fields, CONTRIBUTOR_OCCUPATION),
                entity_type: text(fields, CONTRIBUTOR_ENTITY_TYPE),
            },
            committee_id: text(fields, COMMITTEE_ID),
            committee_name: text(fields, RECIPIENT_COMMITTEE_NAME),
            candidate_id: text(fields, CANDIDATE_ID),
            candidate_name: text(fields, RECIPIENT_CANDIDATE_NAME),
            amount: lookup(fields, AMOUNT).cloned().unwrap_or(Value::Null),
            date: lookup(fields, DATE).cloned().unwrap_or(Value::Null),
            source,
        }),
    }
}

/// First present value among `aliases`.
fn lookup<'a>(fields: &'a Map<String, Value>, aliases: &[&str]) -> Option<&'a Value> {
    aliases
        .iter()
        .filter_map(|alias| get_path(fields, alias))
        .find(|v| is_present(v))
}

fn get_path<'a>(fields: &'a Map<String, Value>, path: &str) -> Option<&'a Value> {
    let mut segments = path.split('.');
    let mut current = fields.get(segments.next()?)?;
    for segment in segments {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.trim().is_empty(),
        Value::Array(items) => !items.is_empty(),
        _ => true,
    }
}

/// Scalar field as trimmed text. Numbers and booleans are rendered.
fn text(fields: &Map<String, Value>, aliases: &[&str]) -> Option<String> {
    aliases
        .iter()
        .filter_map(|alias| get_path(fields, alias))
        .find_map(scalar_text)
}

/// Scalar field exactly as delivered, surrounding whitespace included.
fn raw_text(fields: &Map<String, Value>, aliases: &[&str]) -> Option<String> {
    lookup(fields, aliases).and_then(|v| match v {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// A list of ids given either as a JSON array or a delimited string.
fn id_list(fields: &Map<String, Value>, aliases: &[&str]) -> Vec<String> {
    let raw: Vec<String> = match lookup(fields, aliases) {
        Some(Value::Array(items)) => items.iter().filter_map(scalar_text).collect(),
        Some(Value::String(s)) => s
            .split(|c: char| c == ',' || c == ';' || c.is_whitespace())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        Some(other) => scalar_text(other).into_iter().collect(),
        None => Vec::new(),
    };

    let mut ids = Vec::with_capacity(raw.len());
    for id in raw {
        if !ids.contains(&id) {
            ids.push(id);
        }
    }
    ids
}

/// The contributor address as delivered, untrimmed, since it feeds the
/// fingerprint. Without an address field the FEC street columns are joined.
fn contributor_address(fields: &Map<String, Value>) -> Option<String> {
    if let Some(address) = raw_text(fields, CONTRIBUTOR_ADDRESS) {
        return Some(address);
    }
    let parts: Vec<String> = FEC_ADDRESS_PARTS
        .iter()
        .filter_map(|alias| text(fields, std::slice::from_ref(alias)))
        .collect();
    (!parts.is_empty()).then(|| parts.join(" "))
}

fn collect_attributes(fields: &Map<String, Value>, table: &[(&str, &[&str])]) -> Vec<Attribute> {
    table
        .iter()
        .filter_map(|(key, aliases)| {
            lookup(fields, aliases).map(|v| Attribute::new(*key, v.clone()))
        })
        .collect()
}
