//! Coordination-run records: per-source outcomes and the session envelope.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::run_id;

/// Tag gating which acquisition phases and search terms apply to a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FocusArea {
    Internship,
    NewGrad,
    H1b,
    Remote,
    All,
}

impl FocusArea {
    pub fn as_str(&self) -> &'static str {
        match self {
            FocusArea::Internship => "internship",
            FocusArea::NewGrad => "new_grad",
            FocusArea::H1b => "h1b",
            FocusArea::Remote => "remote",
            FocusArea::All => "all",
        }
    }
}

impl std::str::FromStr for FocusArea {
    type Err = String;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        match input.trim().to_lowercase().replace('-', "_").as_str() {
            "internship" | "internships" => Ok(FocusArea::Internship),
            "new_grad" | "newgrad" => Ok(FocusArea::NewGrad),
            "h1b" => Ok(FocusArea::H1b),
            "remote" => Ok(FocusArea::Remote),
            "all" => Ok(FocusArea::All),
            other => Err(format!("unknown focus area: {other}")),
        }
    }
}

/// One category of acquisition source, executed as an atomic phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceCategory {
    RepoList,
    ExternalSite,
    BoardApi,
    CompanyDirect,
}

impl SourceCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceCategory::RepoList => "repo_list",
            SourceCategory::ExternalSite => "external_site",
            SourceCategory::BoardApi => "board_api",
            SourceCategory::CompanyDirect => "company_direct",
        }
    }
}

/// Outcome of one source in one coordination run. Created when the source
/// starts, finalized exactly once when it completes, immutable after.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceResult {
    pub source_name: String,
    pub category: SourceCategory,
    /// Records returned by the source's adapters, counted before dedup.
    pub jobs_found: u64,
    /// Records persisted after dedup.
    pub jobs_saved: u64,
    pub elapsed_ms: u64,
    pub success: bool,
    pub error_message: Option<String>,
}

impl SourceResult {
    pub fn started(source_name: impl Into<String>, category: SourceCategory) -> Self {
        Self {
            source_name: source_name.into(),
            category,
            jobs_found: 0,
            jobs_saved: 0,
            elapsed_ms: 0,
            success: false,
            error_message: None,
        }
    }
}

/// One end-to-end coordination run. The end timestamp and overall success
/// are set exactly once, after every attempted source has completed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrapeSession {
    pub session_id: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub focus_areas: Vec<FocusArea>,
    pub sources_processed: Vec<SourceResult>,
    pub total_jobs_found: u64,
    pub total_jobs_saved: u64,
    pub success: bool,
}

impl ScrapeSession {
    pub fn new(focus_areas: &[FocusArea]) -> Self {
        let focus_areas = if focus_areas.is_empty() {
            vec![FocusArea::All]
        } else {
            focus_areas.to_vec()
        };

        Self {
            session_id: run_id::generate(),
            started_at: Utc::now(),
            finished_at: None,
            focus_areas,
            sources_processed: Vec::new(),
            total_jobs_found: 0,
            total_jobs_saved: 0,
            success: false,
        }
    }

    /// Record a completed source outcome and fold it into the totals.
    pub fn record(&mut self, result: SourceResult) {
        self.total_jobs_found += result.jobs_found;
        self.total_jobs_saved += result.jobs_saved;
        self.sources_processed.push(result);
    }

    /// Close the session. The first call wins; later calls are ignored so
    /// the end timestamp and success flag are set exactly once.
    pub fn finalize(&mut self, success: bool) {
        if self.finished_at.is_none() {
            self.finished_at = Some(Utc::now());
            self.success = success;
        }
    }

    pub fn is_finalized(&self) -> bool {
        self.finished_at.is_some()
    }
}
