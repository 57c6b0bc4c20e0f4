//! Pre-exported raw records, one JSON object per line

use super::{RecordSource, SourceError};
use crate::record::RawRecord;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

/// Reads `RawRecord`s from a JSON-lines file
#[derive(Debug, Clone)]
pub struct JsonLinesSource {
    path: PathBuf,
}

impl JsonLinesSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl RecordSource for JsonLinesSource {
    fn id(&self) -> &str {
        "import"
    }

    fn process(&mut self, sink: &mut dyn FnMut(RawRecord)) -> Result<usize, SourceError> {
        let file = File::open(&self.path)?;
        read_json_lines(BufReader::new(file), sink)
    }
}

/// Parse every non-blank line as a `RawRecord`.
///
/// Stops at the first malformed line; records before it have already been
/// delivered.
pub fn read_json_lines<R: BufRead>(
    reader: R,
    sink: &mut dyn FnMut(RawRecord),
) -> Result<usize, SourceError> {
    let mut delivered = 0;
    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let record: RawRecord = serde_json::from_str(&line)
            .map_err(|error| SourceError::MalformedLine { line: i + 1, error })?;
        sink(record);
        delivered += 1;
    }
    Ok(delivered)
}
