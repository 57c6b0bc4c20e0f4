//! Record sources
//!
//! A source fetches or reads upstream data and hands each item to a sink
//! as a [`RawRecord`], strictly in delivery order. Sources never touch the
//! graph; failures are reported as [`SourceError`] and abort the run before
//! anything is persisted.

mod fec;
mod jsonl;
mod tracer;

pub use fec::{FecPhase, FecSource};
pub use jsonl::{read_json_lines, JsonLinesSource};
pub use tracer::{extract_csv, read_csv_records, TracerSource};

use crate::record::RawRecord;
use thiserror::Error;

/// Errors from fetching or parsing upstream data
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{origin} returned HTTP {status}: {message}")]
    Status {
        origin: String,
        status: u16,
        message: String,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("line {line}: {error}")]
    MalformedLine {
        line: usize,
        error: serde_json::Error,
    },

    #[error("malformed payload: {0}")]
    Malformed(String),
}

/// The contract sources implement.
pub trait RecordSource {
    /// Short name used in logs (e.g. "fec", "tracer")
    fn id(&self) -> &str;

    /// Deliver every record to `sink`, in order. Returns how many were delivered.
    fn process(&mut self, sink: &mut dyn FnMut(RawRecord)) -> Result<usize, SourceError>;
}
