//! Raw records as delivered by the sources

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Which handler a record is routed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    Candidate,
    Committee,
    Contribution,
}

impl std::fmt::Display for RecordKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RecordKind::Candidate => "candidate",
            RecordKind::Committee => "committee",
            RecordKind::Contribution => "contribution",
        };
        write!(f, "{}", s)
    }
}

/// One upstream item or row, before field-name reconciliation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    pub kind: RecordKind,
    /// Source tag copied into node attributes (e.g. "FEC", "TRACER")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default)]
    pub fields: Map<String, Value>,
}

impl RawRecord {
    pub fn new(kind: RecordKind, fields: Map<String, Value>) -> Self {
        Self {
            kind,
            source: None,
            fields,
        }
    }

    /// Build a record from a JSON object literal. Non-object values yield no fields.
    pub fn from_value(kind: RecordKind, value: Value) -> Self {
        let fields = match value {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        Self::new(kind, fields)
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn kind_serializes_lowercase() {
        assert_eq!(serde_json::to_value(RecordKind::Contribution).unwrap(), "contribution");
        let kind: RecordKind = serde_json::from_str("\"committee\"").unwrap();
        assert_eq!(kind, RecordKind::Committee);
    }

    #[test]
    fn raw_record_deserializes_without_source() {
        let record: RawRecord = serde_json::from_value(json!({
            "kind": "candidate",
            "fields": {"candidate_id": "CAND1"}
        }))
        .unwrap();
        assert_eq!(record.kind, RecordKind::Candidate);
        assert!(record.source.is_none());
        assert_eq!(record.fields["candidate_id"], "CAND1");
    }

    #[test]
    fn from_value_ignores_non_objects() {
        let record = RawRecord::from_value(RecordKind::Committee, json!([1, 2]));
        assert!(record.fields.is_empty());
    }
}
