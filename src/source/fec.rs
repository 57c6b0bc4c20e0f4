//! FEC OpenAPI source: candidates, committees, then Schedule A receipts

use super::{RecordSource, SourceError};
use crate::config::FecConfig;
use crate::record::{RawRecord, RecordKind};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::thread;
use std::time::Duration;
use tracing::{info, warn};

const SOURCE_TAG: &str = "FEC";
const MAX_RETRIES: u32 = 3;
const REQUEST_TIMEOUT_SECS: u64 = 30;
const USER_AGENT: &str = concat!("donorgraph/", env!("CARGO_PKG_VERSION"));

/// One fetch phase. Phases run in declaration order so candidates exist
/// before committees declare support for them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FecPhase {
    Candidates,
    Committees,
    Contributions,
}

impl FecPhase {
    fn endpoint(self) -> &'static str {
        match self {
            FecPhase::Candidates => "candidates/",
            FecPhase::Committees => "committees/",
            FecPhase::Contributions => "schedules/schedule_a/",
        }
    }

    fn kind(self) -> RecordKind {
        match self {
            FecPhase::Candidates => RecordKind::Candidate,
            FecPhase::Committees => RecordKind::Committee,
            FecPhase::Contributions => RecordKind::Contribution,
        }
    }

    /// Schedule A uses keyset pagination; the others are page-numbered.
    fn is_keyset(self) -> bool {
        matches!(self, FecPhase::Contributions)
    }

    /// Filter parameters for this phase, excluding paging.
    fn query(self, config: &FecConfig) -> Vec<(String, String)> {
        let mut params = vec![
            ("api_key".to_string(), config.api_key.clone()),
            ("per_page".to_string(), config.page_size().to_string()),
        ];
        let (state_param, cycle_param) = match self {
            FecPhase::Contributions => ("contributor_state", "two_year_transaction_period"),
            _ => ("state", "cycle"),
        };
        if let Some(state) = &config.state {
            params.push((state_param.to_string(), state.clone()));
        }
        params.push((cycle_param.to_string(), config.cycle.to_string()));
        params
    }
}

impl std::fmt::Display for FecPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            FecPhase::Candidates => "candidates",
            FecPhase::Committees => "committees",
            FecPhase::Contributions => "contributions",
        };
        write!(f, "{}", s)
    }
}

/// One page of an FEC listing
#[derive(Debug, Deserialize)]
struct FecPage {
    #[serde(default)]
    results: Vec<Value>,
    #[serde(default)]
    pagination: FecPagination,
}

#[derive(Debug, Default, Deserialize)]
struct FecPagination {
    #[serde(default)]
    pages: Option<u64>,
    #[serde(default)]
    last_indexes: Option<Map<String, Value>>,
}

/// Where to go after a page, or `None` to stop.
#[derive(Debug, Clone, PartialEq)]
enum NextPage {
    Number(u64),
    Keyset(Vec<(String, String)>),
}

fn next_page(phase: FecPhase, current: u64, page: &FecPage) -> Option<NextPage> {
    if page.results.is_empty() {
        return None;
    }
    if phase.is_keyset() {
        let indexes = page.pagination.last_indexes.as_ref()?;
        let params: Vec<(String, String)> = indexes
            .iter()
            .filter_map(|(k, v)| query_value(v).map(|v| (k.clone(), v)))
            .collect();
        return (!params.is_empty()).then_some(NextPage::Keyset(params));
    }
    let total = page.pagination.pages.unwrap_or(1);
    (current < total).then_some(NextPage::Number(current + 1))
}

fn query_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Blocking FEC client
pub struct FecSource {
    http: reqwest::blocking::Client,
    config: FecConfig,
    /// First retry wait; doubles on every further attempt
    initial_backoff: Duration,
}

impl FecSource {
    pub fn new(config: FecConfig) -> Result<Self, SourceError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self {
            http,
            config,
            initial_backoff: Duration::from_secs(1),
        })
    }

    /// Phases enabled by the configuration, in fetch order
    pub fn phases(&self) -> Vec<FecPhase> {
        [
            (FecPhase::Candidates, self.config.include_candidates),
            (FecPhase::Committees, self.config.include_committees),
            (FecPhase::Contributions, self.config.include_contributions),
        ]
        .into_iter()
        .filter_map(|(phase, enabled)| enabled.then_some(phase))
        .collect()
    }

    fn run_phase(
        &self,
        phase: FecPhase,
        sink: &mut dyn FnMut(RawRecord),
    ) -> Result<usize, SourceError> {
        let base_url = self.config.base_url.trim_end_matches('/');
        let url = format!("{}/{}", base_url, phase.endpoint());
        let base = phase.query(&self.config);
        let mut paging: Vec<(String, String)> = vec![("page".to_string(), "1".to_string())];
        let mut page_number = 1u64;
        let mut delivered = 0usize;

        loop {
            if let Some(max) = self.config.max_pages {
                if page_number > u64::from(max) {
                    info!(%phase, max_pages = max, "page limit reached");
                    break;
                }
            }

            let mut params = base.clone();
            params.extend(paging.iter().cloned());
            let body = self.get_json(&url, &params)?;
            let page: FecPage = serde_json::from_value(body)?;
            info!(%phase, page = page_number, results = page.results.len(), "fetched page");

            let next = next_page(phase, page_number, &page);
            for item in page.results {
                sink(RawRecord::from_value(phase.kind(), item).with_source(SOURCE_TAG));
                delivered += 1;
            }

            match next {
                Some(NextPage::Number(n)) => paging = vec![("page".to_string(), n.to_string())],
                Some(NextPage::Keyset(cursor)) => paging = cursor,
                None => break,
            }
            page_number += 1;
        }
        Ok(delivered)
    }

    /// GET with retry on 429, 5xx and transport errors; doubling backoff.
    /// A 429 carrying `Retry-After` waits that many seconds instead.
    fn get_json(&self, url: &str, params: &[(String, String)]) -> Result<Value, SourceError> {
        let mut backoff = self.initial_backoff;
        let mut attempt = 0u32;
        loop {
            attempt += 1;
            let (wait, retry_reason) = match self.http.get(url).query(params).send() {
                Ok(resp) => {
                    let status = resp.status();
                    if status.is_success() {
                        return Ok(resp.json()?);
                    }
                    let retryable = status.as_u16() == 429 || status.is_server_error();
                    if !retryable {
                        let message = resp.text().unwrap_or_default();
                        return Err(SourceError::Status {
                            origin: url.to_string(),
                            status: status.as_u16(),
                            message: message.chars().take(200).collect(),
                        });
                    }
                    if attempt > MAX_RETRIES {
                        return Err(SourceError::Status {
                            origin: url.to_string(),
                            status: status.as_u16(),
                            message: format!("giving up after {} attempts", attempt),
                        });
                    }
                    let retry_after = resp
                        .headers()
                        .get("retry-after")
                        .and_then(|v| v.to_str().ok())
                        .and_then(|v| v.trim().parse::<u64>().ok())
                        .filter(|_| status.as_u16() == 429)
                        .map(Duration::from_secs);
                    (retry_after.unwrap_or(backoff), format!("HTTP {}", status.as_u16()))
                }
                Err(e) => {
                    if attempt > MAX_RETRIES {
                        return Err(e.into());
                    }
                    (backoff, e.to_string())
                }
            };

            warn!(
                attempt,
                wait_secs = wait.as_secs(),
                reason = %retry_reason,
                "retrying FEC request"
            );
            thread::sleep(wait);
            backoff *= 2;
        }
    }
}

impl RecordSource for FecSource {
    fn id(&self) -> &str {
        "fec"
    }

    fn process(&mut self, sink: &mut dyn FnMut(RawRecord)) -> Result<usize, SourceError> {
        let mut total = 0;
        for phase in self.phases() {
            let delivered = self.run_phase(phase, sink)?;
            info!(%phase, records = delivered, "phase complete");
            total += delivered;
        }
        Ok(total)
    }
}
