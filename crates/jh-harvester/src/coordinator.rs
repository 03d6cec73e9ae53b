//! The source coordinator: runs acquisition phases in a fixed order,
//! isolates their failures, deduplicates by fingerprint within the run, and
//! persists surviving records phase by phase.
//!
//! The coordinator is the error boundary for the whole system: nothing an
//! adapter or the store throws escapes `run()`. A session's overall success
//! reflects only the coordinator's own bookkeeping.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, error, info, warn};

use jh_common::db::{JobStore, StoreError};
use jh_common::session::{FocusArea, ScrapeSession, SourceCategory, SourceResult};
use jh_common::JobPosting;

use crate::adapters::company::CompanyScraper;
use crate::adapters::{focus_applies, SourceAdapter};
use crate::companies::companies_for_run;
use crate::fetch::Politeness;

/// Per-run knobs supplied by the caller.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Cap on records taken from each phase (testing and smoke runs).
    pub max_jobs_per_source: Option<usize>,
    /// Restrict direct scraping to high-priority companies.
    pub priority_only: bool,
    /// Soft run deadline: phases not yet started when it passes are skipped.
    pub deadline: Option<Duration>,
}

/// Orchestrates one coordination run across the configured sources. The
/// dedup set is owned here and cleared per run; independent coordinators
/// never share state.
pub struct SourceCoordinator {
    store: Arc<dyn JobStore>,
    repo_lists: Option<Arc<dyn SourceAdapter>>,
    external_sites: Option<Arc<dyn SourceAdapter>>,
    board_apis: Option<Arc<dyn SourceAdapter>>,
    company_scraper: Option<CompanyScraper>,
    politeness: Politeness,
    seen: HashSet<String>,
}

fn phase_applies(category: SourceCategory, focus: &[FocusArea]) -> bool {
    match category {
        // Curated repo lists exist for the early-career and sponsorship
        // focuses; a remote-only run has nothing to gain from them.
        SourceCategory::RepoList => [FocusArea::Internship, FocusArea::NewGrad, FocusArea::H1b]
            .iter()
            .any(|target| focus_applies(focus, *target)),
        SourceCategory::ExternalSite => focus_applies(focus, FocusArea::Internship),
        SourceCategory::BoardApi | SourceCategory::CompanyDirect => true,
    }
}

impl SourceCoordinator {
    pub fn new(store: Arc<dyn JobStore>) -> Self {
        Self {
            store,
            repo_lists: None,
            external_sites: None,
            board_apis: None,
            company_scraper: None,
            politeness: Politeness::new(1.0, 3.0),
            seen: HashSet::new(),
        }
    }

    pub fn with_repo_lists(mut self, adapter: Arc<dyn SourceAdapter>) -> Self {
        self.repo_lists = Some(adapter);
        self
    }

    pub fn with_external_sites(mut self, adapter: Arc<dyn SourceAdapter>) -> Self {
        self.external_sites = Some(adapter);
        self
    }

    pub fn with_board_apis(mut self, adapter: Arc<dyn SourceAdapter>) -> Self {
        self.board_apis = Some(adapter);
        self
    }

    pub fn with_company_scraper(mut self, scraper: CompanyScraper) -> Self {
        self.company_scraper = Some(scraper);
        self
    }

    pub fn with_politeness(mut self, politeness: Politeness) -> Self {
        self.politeness = politeness;
        self
    }

    /// Execute one coordination run. Never fails: every per-source problem
    /// is captured in that source's `SourceResult`, and the returned session
    /// is always finalized.
    pub async fn run(&mut self, focus: &[FocusArea], options: &RunOptions) -> ScrapeSession {
        self.seen.clear();

        let mut session = ScrapeSession::new(focus);
        let focus = session.focus_areas.clone();
        let started = Instant::now();
        let mut bookkeeping_ok = true;

        info!(
            session_id = %session.session_id,
            focus = ?focus,
            priority_only = options.priority_only,
            "starting coordination run"
        );

        let deadline_hit = |started: &Instant| {
            options
                .deadline
                .map(|deadline| started.elapsed() >= deadline)
                .unwrap_or(false)
        };

        // Fixed phase order: repository lists, external aggregator sites,
        // job-board APIs, then direct company scraping.
        let adapter_phases: Vec<Arc<dyn SourceAdapter>> = [
            self.repo_lists.clone(),
            self.external_sites.clone(),
            self.board_apis.clone(),
        ]
        .into_iter()
        .flatten()
        .filter(|adapter| phase_applies(adapter.category(), &focus))
        .collect();

        let mut skipped_for_deadline = false;

        for adapter in adapter_phases {
            if deadline_hit(&started) {
                skipped_for_deadline = true;
                break;
            }
            let result = self.run_adapter_phase(adapter.as_ref(), &focus, options).await;
            bookkeeping_ok &= self.record_outcome(&session.session_id, &result).await;
            session.record(result);
        }

        if self.company_scraper.is_some()
            && phase_applies(SourceCategory::CompanyDirect, &focus)
            && !skipped_for_deadline
        {
            if deadline_hit(&started) {
                skipped_for_deadline = true;
            } else {
                let result = self.run_company_phase(&focus, options).await;
                bookkeeping_ok &= self.record_outcome(&session.session_id, &result).await;
                session.record(result);
            }
        }

        if skipped_for_deadline {
            warn!(
                session_id = %session.session_id,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "run deadline reached; remaining phases skipped"
            );
        }

        session.finalize(bookkeeping_ok);

        if let Err(err) = self.store.record_session(&session).await {
            // The returned session is still authoritative for the caller.
            error!(session_id = %session.session_id, error = %err, "failed to persist session record");
        }

        info!(
            session_id = %session.session_id,
            sources = session.sources_processed.len(),
            jobs_found = session.total_jobs_found,
            jobs_saved = session.total_jobs_saved,
            success = session.success,
            "coordination run complete"
        );

        session
    }

    async fn run_adapter_phase(
        &mut self,
        adapter: &dyn SourceAdapter,
        focus: &[FocusArea],
        options: &RunOptions,
    ) -> SourceResult {
        let mut result = SourceResult::started(adapter.name(), adapter.category());
        let phase_start = Instant::now();
        info!(source = adapter.name(), "phase started");

        match adapter.fetch(focus).await {
            Ok(mut jobs) => {
                if let Some(max) = options.max_jobs_per_source {
                    jobs.truncate(max);
                }
                result.jobs_found = jobs.len() as u64;

                match self.persist_batch(&jobs).await {
                    Ok(saved) => {
                        result.jobs_saved = saved;
                        result.success = true;
                    }
                    Err(err) => {
                        warn!(
                            source = adapter.name(),
                            error = %err,
                            "phase persistence failed; batch rolled back"
                        );
                        result.error_message = Some(err.to_string());
                    }
                }
            }
            Err(err) => {
                warn!(source = adapter.name(), error = %err, "phase failed");
                result.error_message = Some(err.to_string());
            }
        }

        result.elapsed_ms = phase_start.elapsed().as_millis() as u64;
        result
    }

    async fn run_company_phase(
        &mut self,
        focus: &[FocusArea],
        options: &RunOptions,
    ) -> SourceResult {
        let mut result = SourceResult::started("Company Websites", SourceCategory::CompanyDirect);
        let phase_start = Instant::now();

        let companies = companies_for_run(options.priority_only, focus);
        info!(companies = companies.len(), "company scraping phase started");

        let mut all_jobs: Vec<JobPosting> = Vec::new();
        if let Some(scraper) = &self.company_scraper {
            for company in companies {
                match scraper.scrape_company(company, focus).await {
                    Ok(jobs) => all_jobs.extend(jobs),
                    Err(err) => {
                        // One company failing never aborts its siblings.
                        warn!(company = company.key, error = %err, "company scrape failed; skipping");
                    }
                }
                self.politeness.pause().await;
            }
        }

        if let Some(max) = options.max_jobs_per_source {
            all_jobs.truncate(max);
        }
        result.jobs_found = all_jobs.len() as u64;

        match self.persist_batch(&all_jobs).await {
            Ok(saved) => {
                result.jobs_saved = saved;
                result.success = true;
            }
            Err(err) => {
                warn!(error = %err, "company phase persistence failed; batch rolled back");
                result.error_message = Some(err.to_string());
            }
        }

        result.elapsed_ms = phase_start.elapsed().as_millis() as u64;
        result
    }

    /// Drop fingerprints already seen in this run, then save the remainder
    /// as one batch. Duplicates are silent and structural: they count toward
    /// `jobs_found` but never toward `jobs_saved`.
    async fn persist_batch(&mut self, jobs: &[JobPosting]) -> Result<u64, StoreError> {
        let mut fresh: Vec<JobPosting> = Vec::new();
        for job in jobs {
            let fingerprint = job.fingerprint();
            if self.seen.insert(fingerprint) {
                fresh.push(job.clone());
            } else {
                debug!(title = %job.title, company = %job.company, "duplicate posting dropped");
            }
        }

        if fresh.is_empty() {
            return Ok(0);
        }
        self.store.save_jobs(&fresh).await
    }

    async fn record_outcome(&self, session_id: &str, result: &SourceResult) -> bool {
        match self.store.record_source_outcome(session_id, result).await {
            Ok(()) => true,
            Err(err) => {
                error!(
                    source = %result.source_name,
                    error = %err,
                    "failed to record source outcome"
                );
                false
            }
        }
    }
}
