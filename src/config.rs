//! Run configuration for the record sources

use chrono::{Datelike, NaiveDate, Utc};
use std::path::PathBuf;

/// Base URL of the FEC OpenAPI
pub const FEC_API_BASE: &str = "https://api.open.fec.gov/v1";

/// Bulk CSV export endpoint of Colorado TRACER
pub const TRACER_DOWNLOAD_URL: &str = "https://tracer.sos.colorado.gov/PublicSite/Download.aspx";

/// Key accepted by the FEC API for low-volume anonymous use
pub const FEC_DEMO_KEY: &str = "DEMO_KEY";

/// The FEC caps `per_page` at 100
pub const FEC_MAX_PER_PAGE: u32 = 100;

/// Two-year election cycle containing `date` (cycles end in even years).
pub fn cycle_for(date: NaiveDate) -> i32 {
    let year = date.year();
    year + year.rem_euclid(2)
}

/// Cycle containing today's date
pub fn current_cycle() -> i32 {
    cycle_for(Utc::now().date_naive())
}

/// Settings for the FEC API source
#[derive(Debug, Clone)]
pub struct FecConfig {
    pub api_key: String,
    pub base_url: String,
    /// Two-letter state filter; `None` fetches every state
    pub state: Option<String>,
    pub cycle: i32,
    pub per_page: u32,
    /// Upper bound on pages fetched per phase
    pub max_pages: Option<u32>,
    pub include_candidates: bool,
    pub include_committees: bool,
    pub include_contributions: bool,
}

impl Default for FecConfig {
    fn default() -> Self {
        Self {
            api_key: FEC_DEMO_KEY.to_string(),
            base_url: FEC_API_BASE.to_string(),
            state: Some("CO".to_string()),
            cycle: current_cycle(),
            per_page: FEC_MAX_PER_PAGE,
            max_pages: None,
            include_candidates: true,
            include_committees: true,
            include_contributions: true,
        }
    }
}

impl FecConfig {
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = api_key.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// `per_page` clamped to what the API accepts
    pub fn page_size(&self) -> u32 {
        self.per_page.clamp(1, FEC_MAX_PER_PAGE)
    }
}

/// Settings for the TRACER bulk-download source
#[derive(Debug, Clone)]
pub struct TracerConfig {
    pub base_url: String,
    /// Where downloaded exports are cached
    pub data_dir: PathBuf,
    /// Local files used instead of downloading
    pub candidates: Option<PathBuf>,
    pub committees: Option<PathBuf>,
    pub contributions: Option<PathBuf>,
}

impl Default for TracerConfig {
    fn default() -> Self {
        Self {
            base_url: TRACER_DOWNLOAD_URL.to_string(),
            data_dir: default_tracer_dir(),
            candidates: None,
            committees: None,
            contributions: None,
        }
    }
}

/// Get the default TRACER cache directory (~/.cache/donorgraph/tracer)
pub fn default_tracer_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("donorgraph")
        .join("tracer")
}
