//! Colorado TRACER bulk exports (CSV, optionally zipped)

use super::{RecordSource, SourceError};
use crate::config::TracerConfig;
use crate::record::{RawRecord, RecordKind};
use serde_json::{Map, Value};
use std::fs;
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

const SOURCE_TAG: &str = "TRACER";
const ZIP_MAGIC: &[u8] = b"PK\x03\x04";
const UTF8_BOM: &str = "\u{feff}";
const DOWNLOAD_TIMEOUT_SECS: u64 = 300;

/// Export kinds in processing order, with their download `type` parameter.
const EXPORTS: [(RecordKind, &str); 3] = [
    (RecordKind::Candidate, "candidates"),
    (RecordKind::Committee, "committees"),
    (RecordKind::Contribution, "contributions"),
];

/// Reads candidates, committees and contributions from TRACER exports.
///
/// Each kind comes from a local file when one is configured, otherwise it is
/// downloaded into the cache directory first.
pub struct TracerSource {
    config: TracerConfig,
    http: Option<reqwest::blocking::Client>,
}

impl TracerSource {
    pub fn new(config: TracerConfig) -> Self {
        Self { config, http: None }
    }

    fn local_file(&self, kind: RecordKind) -> Option<&Path> {
        match kind {
            RecordKind::Candidate => self.config.candidates.as_deref(),
            RecordKind::Committee => self.config.committees.as_deref(),
            RecordKind::Contribution => self.config.contributions.as_deref(),
        }
    }

    fn client(&mut self) -> Result<&reqwest::blocking::Client, SourceError> {
        if self.http.is_none() {
            let client = reqwest::blocking::Client::builder()
                .timeout(Duration::from_secs(DOWNLOAD_TIMEOUT_SECS))
                .build()?;
            self.http = Some(client);
        }
        self.http
            .as_ref()
            .ok_or_else(|| SourceError::Malformed("HTTP client unavailable".to_string()))
    }

    /// Download one export into the cache directory and return its path.
    fn download(&mut self, export: &str) -> Result<PathBuf, SourceError> {
        let url = self.config.base_url.clone();
        let dest = self.config.data_dir.join(format!("{}.csv", export));
        fs::create_dir_all(&self.config.data_dir)?;

        info!(%url, export, dest = %dest.display(), "downloading TRACER export");
        let resp = self.client()?.get(&url).query(&[("type", export)]).send()?;
        let status = resp.status();
        if !status.is_success() {
            return Err(SourceError::Status {
                origin: url,
                status: status.as_u16(),
                message: format!("download of {} failed", export),
            });
        }
        let bytes = resp.bytes()?;
        fs::write(&dest, &bytes)?;
        Ok(dest)
    }
}

impl RecordSource for TracerSource {
    fn id(&self) -> &str {
        "tracer"
    }

    fn process(&mut self, sink: &mut dyn FnMut(RawRecord)) -> Result<usize, SourceError> {
        let mut total = 0;
        for (kind, export) in EXPORTS {
            let path = match self.local_file(kind).map(Path::to_path_buf) {
                Some(path) => path,
                None => self.download(export)?,
            };
            let csv = extract_csv(fs::read(&path)?)?;
            let rows = read_csv_records(csv.as_slice(), kind, sink)?;
            info!(%kind, rows, path = %path.display(), "read TRACER export");
            total += rows;
        }
        Ok(total)
    }
}

/// Return the CSV payload, unpacking it first if `bytes` is a ZIP archive.
///
/// The first entry whose name ends in `.csv` is used.
pub fn extract_csv(bytes: Vec<u8>) -> Result<Vec<u8>, SourceError> {
    if !bytes.starts_with(ZIP_MAGIC) {
        return Ok(bytes);
    }
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))?;
    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        if !entry.name().to_ascii_lowercase().ends_with(".csv") {
            continue;
        }
        debug!(entry = entry.name(), "extracting CSV from archive");
        let mut out = Vec::new();
        entry.read_to_end(&mut out)?;
        return Ok(out);
    }
    Err(SourceError::Malformed("archive contains no .csv entry".to_string()))
}

/// Deliver each CSV row as a record of `kind` with string fields keyed by header.
///
/// Invalid UTF-8 is replaced rather than rejected; short rows simply lack
/// the trailing fields.
pub fn read_csv_records<R: Read>(
    reader: R,
    kind: RecordKind,
    sink: &mut dyn FnMut(RawRecord),
) -> Result<usize, SourceError> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);

    let headers: Vec<String> = reader
        .byte_headers()?
        .iter()
        .enumerate()
        .map(|(i, h)| {
            let h = String::from_utf8_lossy(h);
            let h: &str = if i == 0 { h.trim_start_matches(UTF8_BOM) } else { &h };
            h.trim().to_string()
        })
        .collect();

    let mut rows = 0;
    let mut record = csv::ByteRecord::new();
    while reader.read_byte_record(&mut record)? {
        let mut fields = Map::new();
        for (header, value) in headers.iter().zip(record.iter()) {
            if header.is_empty() {
                continue;
            }
            let value = String::from_utf8_lossy(value).into_owned();
            fields.insert(header.clone(), Value::String(value));
        }
        sink(RawRecord::new(kind, fields).with_source(SOURCE_TAG));
        rows += 1;
    }
    Ok(rows)
}
