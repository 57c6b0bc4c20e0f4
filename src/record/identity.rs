//! Identity resolution: stable node ids from natural keys
//!
//! All fallback and collision policy lives here. Each entity kind has one
//! [`EntityKey`] variant:
//!
//! - **Candidate**: the upstream `candidate_id`, nothing else.
//! - **Committee**: the upstream `committee_id`, else `committee_` plus the
//!   name with whitespace replaced by `_`. A name-derived id and an
//!   upstream id for the same committee are never reconciled.
//! - **Contributor**: the upstream `contributor_id`, else the SHA-1 hex of
//!   `name ++ address` exactly as delivered, padding included, so ids match
//!   snapshots written by earlier TRACER imports. Same name and address
//!   means same contributor.

use super::normalize::{CandidateRecord, CommitteeRecord, ContributorFields};
use crate::graph::NodeId;
use sha1::{Digest, Sha1};

/// Prefix for committee ids derived from a name
const COMMITTEE_NAME_PREFIX: &str = "committee_";

/// The natural keys available for one participant of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKey<'a> {
    Candidate {
        candidate_id: Option<&'a str>,
    },
    Committee {
        committee_id: Option<&'a str>,
        name: Option<&'a str>,
    },
    Contributor {
        contributor_id: Option<&'a str>,
        name: Option<&'a str>,
        address: Option<&'a str>,
    },
}

impl EntityKey<'_> {
    /// Compute the node id, or `None` when the keys cannot identify the entity.
    pub fn resolve(&self) -> Option<NodeId> {
        match *self {
            EntityKey::Candidate { candidate_id } => present(candidate_id).map(NodeId::from),
            EntityKey::Committee { committee_id, name } => present(committee_id)
                .map(NodeId::from)
                .or_else(|| present(name).map(|n| NodeId::from(committee_name_id(n)))),
            EntityKey::Contributor {
                contributor_id,
                name,
                address,
            } => present(contributor_id).map(NodeId::from).or_else(|| {
                name.filter(|n| !n.trim().is_empty())
                    .map(|n| NodeId::from(contributor_fingerprint(n, address.unwrap_or(""))))
            }),
        }
    }

    /// Short role name used in diagnostics
    pub fn role(&self) -> &'static str {
        match self {
            EntityKey::Candidate { .. } => "candidate",
            EntityKey::Committee { .. } => "committee",
            EntityKey::Contributor { .. } => "contributor",
        }
    }
}

fn present(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Deterministic contributor id: lowercase hex SHA-1 of `name` followed by `address`.
pub fn contributor_fingerprint(name: &str, address: &str) -> String {
    let mut hasher = Sha1::new();
    hasher.update(name.as_bytes());
    hasher.update(address.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Committee id synthesized from a display name.
pub fn committee_name_id(name: &str) -> String {
    let normalized: String = name
        .trim()
        .chars()
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .collect();
    format!("{}{}", COMMITTEE_NAME_PREFIX, normalized)
}

impl CandidateRecord {
    pub fn entity_key(&self) -> EntityKey<'_> {
        EntityKey::Candidate {
            candidate_id: self.candidate_id.as_deref(),
        }
    }
}

impl CommitteeRecord {
    pub fn entity_key(&self) -> EntityKey<'_> {
        EntityKey::Committee {
            committee_id: self.committee_id.as_deref(),
            name: self.name.as_deref(),
        }
    }
}

impl ContributorFields {
    pub fn entity_key(&self) -> EntityKey<'_> {
        EntityKey::Contributor {
            contributor_id: self.contributor_id.as_deref(),
            name: self.raw_name.as_deref(),
            address: self.address.as_deref(),
        }
    }
}
