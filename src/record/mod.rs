//! Source records: raw upstream rows, their normalized form, and identity
//!
//! Raw records arrive from the sources as a kind tag plus a bag of fields
//! whose names vary by source (`contributor_name` from the FEC API,
//! `ContributorName` from TRACER CSV). [`normalize`] reconciles the names;
//! [`EntityKey`] turns the reconciled natural keys into stable node ids.

mod identity;
mod normalize;
mod raw;

pub use identity::{committee_name_id, contributor_fingerprint, EntityKey};
pub use normalize::{
    normalize, CandidateRecord, CommitteeRecord, ContributionRecord, ContributorFields,
    NormalizedRecord,
};
pub use raw::{RawRecord, RecordKind};
